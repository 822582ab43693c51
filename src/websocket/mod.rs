//! WebSocket Live Sessions
//!
//! A live session keeps one page's selection on the server and pushes only
//! the outputs an interaction changed.
//!
//! ## Architecture
//!
//! - **SessionHub**: Owns every session's selection
//! - **Handler**: Handles WebSocket upgrade and message processing
//! - **Messages**: Defines client and server message formats
//!
//! ## Example
//!
//! ```javascript
//! // Browser
//! const ws = new WebSocket('ws://localhost:8050/ws');
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'update' && msg.clear_overlay) {
//!     histogram.clearSelection();
//!   }
//! };
//!
//! // Clicking a bar
//! ws.send(JSON.stringify({type: 'event', event: {type: 'bar_clicked', month: 'Aug'}}));
//! ```

mod handler;
mod hub;
mod messages;

pub use handler::websocket_handler;
pub use hub::{HubConfig, HubError, SessionHub, SessionId};
pub use messages::{ClientMessage, ServerMessage};
