//! API Routes
//!
//! Route handlers organized by functionality.

pub mod dashboard;
pub mod dispatch;
pub mod health;
pub mod options;
