//! Home Dashboard CLI
//!
//! One-shot commands against the dashboard API:
//! - Show the dashboard and appliance list
//! - Manage appliances and their cleaning schedules
//! - Record and clear temperature readings

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use home_dashboard::view::render;
use home_dashboard::{
    generate_default_config, ApiClient, AppliancesController, Config, DashboardController,
    ViewStore,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "home-dashboard-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Household appliance schedules and room temperatures")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL (default: from config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show due tasks and per-room temperature charts
    Dashboard,

    /// List appliances
    Appliances,

    /// Create an appliance
    AddAppliance {
        /// Appliance name
        name: String,
        /// Cleaning interval in days (omit or 0 for unscheduled)
        #[arg(short, long)]
        interval: Option<u32>,
    },

    /// Unschedule a scheduled appliance, or schedule an unscheduled one
    ToggleInterval {
        /// Appliance ID
        id: i64,
    },

    /// Set or clear an appliance's cleaning interval
    SetInterval {
        /// Appliance ID
        id: i64,
        /// Interval in days (omit to unschedule)
        #[arg(short, long)]
        days: Option<u32>,
    },

    /// Delete appliances
    Delete {
        /// Appliance IDs
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Show an appliance's cleaning tasks
    Tasks {
        /// Appliance ID
        id: i64,
    },

    /// Mark a task complete
    Complete {
        /// Task ID
        task_id: i64,
    },

    /// Record a temperature reading
    AddTemp {
        /// Temperature in degrees Celsius
        #[arg(allow_negative_numbers = true)]
        value: f64,
        /// Room name (default: "default")
        #[arg(short, long, default_value = "")]
        room: String,
    },

    /// Clear temperature readings
    ClearTemps {
        /// Only clear this room (default: all rooms)
        #[arg(short, long)]
        room: Option<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Config written to {}", path.display());
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let mut config = Config::resolve(cli.config.as_deref())?;
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    home_dashboard::logging::init_logging(&config.logging);

    let api = Arc::new(
        ApiClient::new(config.api.client_config()).context("Failed to build API client")?,
    );
    let store = Arc::new(ViewStore::new());
    let area = config.chart.plot_area();
    let dashboard = DashboardController::new(api.clone(), store.clone()).with_plot_area(area);
    let appliances = AppliancesController::new(api, store.clone())
        .with_default_interval(config.appliances.default_interval_days);
    let format = cli.format;

    match cli.command {
        Commands::Dashboard => {
            dashboard.load().await?;
            let view = dashboard.view().await.unwrap_or_default();
            match format {
                OutputFormat::Json => print_json(&view)?,
                OutputFormat::Table => print!("{}", render::dashboard_text(&view, area, None)),
            }
        }

        Commands::Appliances => {
            appliances.refresh().await?;
            print_cards(&appliances, None, format).await?;
        }

        Commands::AddAppliance { name, interval } => {
            match appliances.create(&name, interval).await? {
                Some(created) => match format {
                    OutputFormat::Json => print_json(&created)?,
                    OutputFormat::Table => println!("Created appliance #{} {}", created.id, created.name),
                },
                None => anyhow::bail!("Appliance name must not be blank"),
            }
        }

        Commands::ToggleInterval { id } => {
            appliances.refresh().await?;
            let updated = appliances
                .toggle_interval(id)
                .await?
                .with_context(|| format!("No appliance with id {}", id))?;
            print_interval(&updated, format)?;
        }

        Commands::SetInterval { id, days } => {
            appliances.refresh().await?;
            let updated = appliances.set_interval(id, days).await?;
            print_interval(&updated, format)?;
        }

        Commands::Delete { ids } => {
            appliances.refresh().await?;
            for id in &ids {
                appliances.select(*id).await;
            }
            let deleted = appliances.bulk_delete_selected().await?;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({ "deleted": deleted }))?,
                OutputFormat::Table => println!("Deleted {} appliance(s)", deleted),
            }
        }

        Commands::Tasks { id } => {
            appliances.refresh().await?;
            appliances.load_tasks(id).await?;
            print_cards(&appliances, Some(id), format).await?;
        }

        Commands::Complete { task_id } => {
            let task = dashboard.complete_task(task_id).await?;
            match format {
                OutputFormat::Json => print_json(&task)?,
                OutputFormat::Table => println!("Task #{} completed", task.id),
            }
        }

        Commands::AddTemp { value, room } => {
            let reading = dashboard
                .add_reading(value, &room)
                .await?
                .context("Temperature must be a finite number")?;
            match format {
                OutputFormat::Json => print_json(&reading)?,
                OutputFormat::Table => println!("Recorded {:.1}°C in {}", reading.value_c, reading.room),
            }
        }

        Commands::ClearTemps { room } => {
            let deleted = dashboard.clear_readings(room.as_deref()).await?;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({ "deleted": deleted }))?,
                OutputFormat::Table => match room {
                    Some(room) => println!("Cleared {} reading(s) from {}", deleted, room),
                    None => println!("Cleared {} reading(s)", deleted),
                },
            }
        }

        // Written above without touching the server
        Commands::Config { .. } => {}
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_interval(appliance: &home_dashboard::Appliance, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(appliance),
        OutputFormat::Table => {
            println!(
                "#{} {}: {}",
                appliance.id,
                appliance.name,
                home_dashboard::view::appliances::schedule_label(appliance.cleaning_interval_days)
            );
            Ok(())
        }
    }
}

async fn print_cards(
    appliances: &AppliancesController,
    only: Option<i64>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut cards = appliances.cards(Utc::now()).await;
    if let Some(id) = only {
        cards.retain(|c| c.appliance.id == id);
    }
    match format {
        OutputFormat::Json => print_json(&cards),
        OutputFormat::Table => {
            print!("{}", render::appliances_text(&cards, None));
            Ok(())
        }
    }
}
