//! Firemap CLI
//!
//! Command-line interface for Firemap operations:
//! - Render dashboard outputs offline from the configured tables
//! - Query a running server
//! - Generate a config file

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use firemap::config::Config;
use firemap::dashboard::{Dashboard, Selection};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "firemap-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Wildfire detection dashboard tools")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8050", global = true)]
    pub api_url: String,

    /// Config file for offline commands (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render outputs offline and print them as JSON
    Render {
        /// State to chart (default: first configured location)
        #[arg(short, long)]
        state: Option<String>,
        /// Month as a number, code or name (default: none selected)
        #[arg(short, long)]
        month: Option<String>,
        /// Which output to print
        #[arg(short, long, value_enum, default_value = "all")]
        output: RenderOutput,
    },

    /// Print the summary lines for a selection
    Summary {
        #[arg(short, long)]
        state: Option<String>,
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Fetch the dashboard from a running server
    View {
        #[arg(short, long)]
        state: Option<String>,
        #[arg(short, long)]
        month: Option<String>,
        /// Print the full JSON response
        #[arg(long)]
        json: bool,
    },

    /// Show server status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RenderOutput {
    Bar,
    Map,
    Summary,
    All,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            state,
            month,
            output,
        } => {
            let dashboard = load_dashboard(cli.config.as_ref())?;
            let selection = dashboard.parse_selection(state.as_deref(), month.as_deref())?;
            let view = dashboard.render(&selection);

            let json = match output {
                RenderOutput::Bar => serde_json::to_string_pretty(&view.bar_chart)?,
                RenderOutput::Map => serde_json::to_string_pretty(&view.map)?,
                RenderOutput::Summary => serde_json::to_string_pretty(&view.summary)?,
                RenderOutput::All => serde_json::to_string_pretty(&view)?,
            };
            println!("{}", json);
        }

        Commands::Summary { state, month } => {
            let dashboard = load_dashboard(cli.config.as_ref())?;
            let selection = dashboard.parse_selection(state.as_deref(), month.as_deref())?;
            let view = dashboard.render(&selection);

            print_selection(&selection);
            println!("{}", view.summary.total_fires);
            println!("{}", view.summary.selection_total);
            println!("{}", view.summary.month_label);
        }

        Commands::View { state, month, json } => {
            let client = reqwest::Client::new();

            let mut query = Vec::new();
            if let Some(state) = &state {
                query.push(("state", state.as_str()));
            }
            if let Some(month) = &month {
                query.push(("month", month.as_str()));
            }

            let response = client
                .get(format!("{}/api/v1/dashboard", cli.api_url))
                .query(&query)
                .send()
                .await
                .with_context(|| format!("cannot connect to Firemap API at {}", cli.api_url))?;

            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                bail!("request failed ({}): {}", status, text);
            }

            let data: serde_json::Value = response.json().await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                print_view(&data);
            }
        }

        Commands::Status => {
            let client = reqwest::Client::new();
            let response = client
                .get(format!("{}/health", cli.api_url))
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: serde_json::Value = resp.json().await?;

                    println!("Firemap v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!(
                        "API Status: {}",
                        health["status"].as_str().unwrap_or("unknown")
                    );

                    if let Some(dataset) = health.get("dataset") {
                        println!();
                        println!("Dataset:");
                        if let Some(rows) = dataset["point_rows"].as_u64() {
                            println!("  Point rows: {}", rows);
                        }
                        if let Some(rows) = dataset["aggregate_rows"].as_u64() {
                            println!("  Aggregate rows: {}", rows);
                        }
                        if let Some(total) = dataset["total_count"].as_u64() {
                            println!("  Total detections: {}", total);
                        }
                    }

                    if let Some(sessions) = health["sessions"].as_u64() {
                        println!();
                        println!("Live sessions: {}", sessions);
                    }

                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => {
                    bail!("API returned error: {}", resp.status());
                }
                Err(e) => {
                    eprintln!("Cannot connect to Firemap API at {}", cli.api_url);
                    eprintln!();
                    eprintln!("Make sure the Firemap server is running:");
                    eprintln!("  cargo run --bin firemap");
                    return Err(e.into());
                }
            }
        }

        Commands::Config { output } => {
            let config = firemap::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn load_dashboard(config_path: Option<&PathBuf>) -> anyhow::Result<Dashboard> {
    let config = match config_path {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load_default().context("loading config")?,
    };

    let dataset = config
        .dataset_loader()
        .load()
        .context("loading detection dataset")?;

    Ok(Dashboard::new(Arc::new(dataset), config.map.settings()))
}

fn print_selection(selection: &Selection) {
    let month = selection
        .month
        .map(|m| m.name().to_string())
        .unwrap_or_else(|| "none".to_string());
    println!("{} / {}", selection.state, month);
    println!("{}", "-".repeat(30));
}

fn print_view(data: &serde_json::Value) {
    println!(
        "{} / {}",
        data["selection"]["state"].as_str().unwrap_or("-"),
        data["selection"]["month"].as_str().unwrap_or("none")
    );
    println!("{}", "-".repeat(30));

    for key in ["total_fires", "selection_total", "month_label"] {
        println!("{}", data["summary"][key].as_str().unwrap_or("-"));
    }

    if let Some(bars) = data["bar_chart"]["bars"].as_array() {
        println!();
        println!("{:<6} {:>10}", "Month", "Count");
        for bar in bars {
            let marker = if bar["highlighted"].as_bool().unwrap_or(false) {
                " *"
            } else {
                ""
            };
            println!(
                "{:<6} {:>10}{}",
                bar["month"].as_str().unwrap_or("-"),
                bar["count"].as_u64().unwrap_or(0),
                marker
            );
        }
    }

    if let Some(points) = data["map"]["points"]["lat"].as_array() {
        println!();
        println!("Map points: {}", points.len());
    }
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
