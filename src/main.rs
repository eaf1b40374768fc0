use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use budget_planner::classifier::ClassifierKind;
use budget_planner::config::{Config, ConfigOverrides};
use budget_planner::output::csv::{plan_to_csv, projection_to_csv};
use budget_planner::output::json::render_json;
use budget_planner::output::table::{
    render_minimum_check_table, render_plan_table, render_projection_table,
};
use budget_planner::planner::minimums::{check_minimums, MinimumCheck};
use budget_planner::planner::PlanResult;
use budget_planner::projection::{project, Projection, ProjectionRequest};
use budget_planner::reference::loader::{load_minimums, load_reference};
use budget_planner::server::run_server;
use budget_planner::types::{Plan, PlanRequest};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "budget-planner",
    about = "Budget allocation plans sized to a savings goal"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Directory holding plans.json, mins.json, association_rules_class.csv and model.json.
    #[arg(short, long)]
    data_dir: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[arg(long)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build a plan from a JSON request file.
    Plan {
        #[arg(short, long)]
        request: PathBuf,
        /// Run a single classifier strategy instead of both.
        #[arg(short, long)]
        strategy: Option<String>,
    },
    /// Check a plan's allocations against the minimum expense floors.
    Check {
        #[arg(short, long)]
        plan: PathBuf,
        #[arg(short, long)]
        income: f64,
        #[arg(long)]
        foreign: bool,
    },
    /// Project savings progress over a duration.
    Project {
        #[arg(short, long)]
        request: PathBuf,
    },
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    let (host, port) = match &cli.command {
        Commands::Serve { host, port } => (host.clone(), *port),
        _ => (None, None),
    };
    config.apply_overrides(ConfigOverrides {
        data_dir: cli.data_dir.clone(),
        host,
        port,
        log_level: cli.log_level.clone(),
    });

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level)),
        )
        .init();

    match &cli.command {
        Commands::Config { init, show } => {
            handle_config_command(*init, *show, &config, &config_path)?;
        }
        Commands::Serve { .. } => {
            let bind = format!("{}:{}", config.server.host, config.server.port);
            let addr: SocketAddr = bind
                .parse()
                .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
            run_server(config, addr).await?;
        }
        Commands::Plan { request, strategy } => {
            let request: PlanRequest = read_json(request)?;
            let (profile, goal) = request.validate()?;
            let strategy = strategy
                .as_deref()
                .map(ClassifierKind::from_str)
                .transpose()?;
            let reference = load_reference(&config.data)?;
            info!(fingerprint = %reference.fingerprint(), "reference snapshot loaded");
            let result = match strategy {
                Some(kind) => reference.plan_with(kind, &profile, &goal),
                None => reference.create_plan(&profile, &goal),
            };
            if !result.is_success() {
                warn!(status = result.status.as_tag(), "{}", result.message);
            }
            print_plan(&result, profile.income, cli.output)?;
        }
        Commands::Check {
            plan,
            income,
            foreign,
        } => {
            let plan: Plan = read_json(plan)?;
            let minimums = load_minimums(&config.data.resolved_minimums_path())?;
            let check = check_minimums(&plan, *income, &minimums, *foreign);
            print_check(&check, cli.output)?;
        }
        Commands::Project { request } => {
            let request: ProjectionRequest = read_json(request)?;
            let projection = project(&request, config.projection.default_poly_degree)?;
            print_projection(&projection, cli.output)?;
        }
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("failed parsing {}", path.display()))
}

fn handle_config_command(init: bool, show: bool, config: &Config, config_path: &Path) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn print_plan(result: &PlanResult, income: f64, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_plan_table(result, income)),
        OutputFormat::Json => println!("{}", render_json(result)?),
        OutputFormat::Csv => println!("{}", plan_to_csv(result, income)?),
    }
    Ok(())
}

fn print_check(check: &MinimumCheck, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_minimum_check_table(check)),
        OutputFormat::Json => println!("{}", render_json(check)?),
        OutputFormat::Csv => {
            warn!("CSV output for check not implemented, using JSON");
            println!("{}", render_json(check)?);
        }
    }
    Ok(())
}

fn print_projection(projection: &Projection, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_projection_table(projection)),
        OutputFormat::Json => println!("{}", render_json(projection)?),
        OutputFormat::Csv => println!("{}", projection_to_csv(projection)?),
    }
    Ok(())
}
