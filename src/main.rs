use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use diet_dashboard::binder::buffer::BufferedSurface;
use diet_dashboard::client::http::HttpOptimizerClient;
use diet_dashboard::client::{ClientError, OptimizerApi, BACKEND_UNREACHABLE};
use diet_dashboard::config::{Config, ConfigOverrides, RequestOverrides, TargetOverrides};
use diet_dashboard::dashboard::Dashboard;
use diet_dashboard::history::aggregator::summarize_history;
use diet_dashboard::history::HistorySummary;
use diet_dashboard::output::csv::{diet_to_csv, foods_to_csv, history_to_csv};
use diet_dashboard::output::json::render_json;
use diet_dashboard::report::profile::{ActivityLevel, Gender, Goal, Profile};
use diet_dashboard::report::OptimizationView;
use diet_dashboard::server::run_server;
use diet_dashboard::types::Food;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "diet-dashboard",
    about = "Dashboard for a remote diet optimization service"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Base URL of the optimizer service.
    #[arg(short, long)]
    backend: Option<String>,
    /// Request timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Args, Clone, Default)]
struct OptimizeArgs {
    /// ga, csp or both.
    #[arg(short, long)]
    technique: Option<String>,
    #[arg(long)]
    budget: Option<f64>,
    #[arg(long)]
    calories: Option<f64>,
    #[arg(long)]
    protein: Option<f64>,
    #[arg(long)]
    carbs: Option<f64>,
    #[arg(long)]
    fat: Option<f64>,
    #[arg(long = "population")]
    population_size: Option<u32>,
    #[arg(long)]
    generations: Option<u32>,
    #[arg(long = "mutation-rate")]
    mutation_rate: Option<f64>,
    #[arg(long = "max-qty")]
    max_qty_per_food: Option<u32>,
    #[arg(long)]
    tolerance: Option<f64>,
    /// Body weight in kg; recommends targets from the profile flags.
    #[arg(long, requires_all = ["height", "age"])]
    weight: Option<f64>,
    /// Height in cm.
    #[arg(long, requires = "weight")]
    height: Option<f64>,
    #[arg(long, requires = "weight")]
    age: Option<u32>,
    #[arg(long, requires = "weight")]
    gender: Option<Gender>,
    /// sedentary, light, moderate, active or very_active.
    #[arg(long, requires = "weight")]
    activity: Option<ActivityLevel>,
    /// lose, maintain or gain.
    #[arg(long, requires = "weight")]
    goal: Option<Goal>,
}

impl OptimizeArgs {
    fn profile(&self) -> Option<Profile> {
        Some(Profile {
            weight_kg: self.weight?,
            height_cm: self.height?,
            age: self.age?,
            gender: self.gender.unwrap_or(Gender::Male),
            activity: self.activity.unwrap_or(ActivityLevel::Moderate),
            goal: self.goal.unwrap_or(Goal::Maintain),
        })
    }
}

impl From<OptimizeArgs> for RequestOverrides {
    fn from(value: OptimizeArgs) -> Self {
        Self {
            profile: value.profile(),
            targets: TargetOverrides {
                calories: value.calories,
                protein: value.protein,
                carbs: value.carbs,
                fat: value.fat,
            },
            technique: value.technique,
            budget: value.budget,
            population_size: value.population_size,
            generations: value.generations,
            mutation_rate: value.mutation_rate,
            max_qty_per_food: value.max_qty_per_food,
            tolerance: value.tolerance,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    Optimize(OptimizeArgs),
    Foods {
        #[command(subcommand)]
        action: FoodsCommand,
    },
    History,
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

#[derive(Debug, Subcommand)]
enum FoodsCommand {
    List,
    Add {
        name: String,
        #[arg(long)]
        calories: f64,
        #[arg(long)]
        protein: f64,
        #[arg(long)]
        carbs: f64,
        #[arg(long)]
        fat: f64,
        #[arg(long)]
        price: f64,
    },
    Delete {
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    if let Commands::Config { init, show } = &cli.command {
        return handle_config_command(*init, *show, &config_path);
    }

    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        backend_url: cli.backend.clone(),
        timeout_secs: cli.timeout,
    });
    let client = HttpOptimizerClient::new(&config.backend)
        .with_context(|| format!("cannot use backend {}", config.backend.url))?;
    info!("using optimizer at {}", client.base_url());
    let api: Arc<dyn OptimizerApi> = Arc::new(client);

    if let Commands::Serve { host, port } = &cli.command {
        let host = host.clone().unwrap_or_else(|| config.server.host.clone());
        let port = port.unwrap_or(config.server.port);
        let bind = format!("{host}:{port}");
        let addr: SocketAddr = bind
            .parse()
            .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
        return run_server(config, api, addr).await;
    }

    let mut dashboard = Dashboard::new(api, config.backend.request_timeout());
    let mut surface = BufferedSurface::from_display(&config.display);

    match &cli.command {
        Commands::Optimize(args) => {
            let overrides: RequestOverrides = args.clone().into();
            if let (Some(profile), OutputFormat::Table) = (&overrides.profile, cli.output) {
                let (bmi, category) = profile.bmi();
                println!(
                    "BMI: {bmi:.1} ({category}), maintenance {} kcal",
                    profile.tdee()
                );
            }
            let request = config.defaults.resolve_request(overrides)?;
            let result = dashboard.submit(&mut surface, &request).await;
            if matches!(cli.output, OutputFormat::Table) {
                println!("{}", surface.render());
            }
            let view = finish(result, cli.output)?;
            print_view(&view, cli.output)?;
        }
        Commands::Foods { action } => {
            let result = match action {
                FoodsCommand::List => dashboard.load_foods(&mut surface).await,
                FoodsCommand::Add {
                    name,
                    calories,
                    protein,
                    carbs,
                    fat,
                    price,
                } => {
                    let food = Food {
                        name: name.trim().to_string(),
                        calories: *calories,
                        protein: *protein,
                        carbs: *carbs,
                        fat: *fat,
                        price: *price,
                    };
                    food.validate()?;
                    dashboard.add_food(&mut surface, &food).await
                }
                FoodsCommand::Delete { name } => dashboard.delete_food(&mut surface, name).await,
            };
            if matches!(cli.output, OutputFormat::Table) {
                println!("{}", surface.render());
            }
            let foods = finish(result, cli.output)?;
            print_foods(&foods, cli.output)?;
        }
        Commands::History => {
            let result = dashboard.load_history(&mut surface).await;
            if matches!(cli.output, OutputFormat::Table) {
                println!("{}", surface.render());
            }
            let summary = finish(result, cli.output)?;
            print_history(&summary, cli.output)?;
        }
        Commands::Serve { .. } => unreachable!("serve command handled before dispatch"),
        Commands::Config { .. } => unreachable!("config command handled before dispatch"),
    }

    dashboard.close(&mut surface);
    Ok(())
}

// The rendered surface already shows the generic message in table mode and
// the session logged the cause, so only the exit status is left to report.
fn finish<T>(result: std::result::Result<T, ClientError>, format: OutputFormat) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(_) if matches!(format, OutputFormat::Table) => std::process::exit(1),
        Err(_) => Err(anyhow!(BACKEND_UNREACHABLE)),
    }
}

fn handle_config_command(init: bool, show: bool, config_path: &Path) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        let config = Config::load(Some(config_path))?;
        println!("{}", render_json(&config)?);
    }
    Ok(())
}

fn print_view(view: &OptimizationView, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {}
        OutputFormat::Json => println!("{}", render_json(view)?),
        OutputFormat::Csv => print!("{}", diet_to_csv(view)?),
    }
    Ok(())
}

fn print_foods(foods: &[Food], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {}
        OutputFormat::Json => println!("{}", render_json(foods)?),
        OutputFormat::Csv => print!("{}", foods_to_csv(foods)?),
    }
    Ok(())
}

fn print_history(summary: &HistorySummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            if summary.is_empty() {
                println!("{}", summarize_history(summary));
            }
        }
        OutputFormat::Json => println!("{}", render_json(summary)?),
        OutputFormat::Csv => print!("{}", history_to_csv(summary)?),
    }
    Ok(())
}
