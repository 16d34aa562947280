use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use employee_desk::{config::AppConfig, connect, ui};
use platform_obs::{ObsConfig, init_tracing};
use tracing::warn;

#[derive(Parser, Debug)]
#[command(
    name = "employee-desk",
    version,
    about = "Manage employees against an in-process fake backend"
)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the interactive desk (default).
    Run,
    /// Print the employee list and exit.
    List,
    /// Print the selectable departments.
    Departments,
}

#[derive(Args, Debug)]
struct Overrides {
    #[arg(long, value_name = "DIR", help = "Directory holding the fixture file")]
    assets_dir: Option<PathBuf>,
    #[arg(long, value_name = "MS", help = "Simulated backend latency")]
    latency_ms: Option<u64>,
    #[arg(long, value_name = "PREFIX", help = "Path prefix in front of /employes")]
    api_base: Option<String>,
}

impl Overrides {
    fn apply(self, config: &mut AppConfig) {
        if let Some(dir) = self.assets_dir {
            config.backend.assets_dir = dir;
        }
        if let Some(ms) = self.latency_ms {
            config.backend.latency = Duration::from_millis(ms);
        }
        if let Some(base) = self.api_base {
            config.api_base = base;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    cli.overrides.apply(&mut config);
    init_tracing(ObsConfig {
        env_filter: config.log_filter.clone(),
        ..ObsConfig::default()
    })?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run_desk(&config).await,
        Command::List => print_list(&config).await,
        Command::Departments => {
            ui::render_departments(&mut std::io::stdout())?;
            Ok(())
        }
    }
}

async fn run_desk(config: &AppConfig) -> Result<()> {
    let mut controller = connect(config, Arc::new(ui::StderrAlert))?;
    let indicator = ui::spawn_loading_indicator(controller.subscribe_loading());
    if controller.initialize().await.is_err() {
        warn!("starting with an empty employee list");
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    ui::run(&mut controller, stdin, &mut std::io::stdout())
        .await
        .context("terminal session failed")?;

    drop(controller);
    ui::finish_loading_indicator(indicator).await;
    Ok(())
}

async fn print_list(config: &AppConfig) -> Result<()> {
    let mut controller = connect(config, Arc::new(ui::StderrAlert))?;
    controller
        .initialize()
        .await
        .with_context(|| format!("failed to load {}", config.backend.fixture_path()))?;
    ui::render_employees(controller.employees(), &mut std::io::stdout())?;
    Ok(())
}
