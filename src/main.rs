use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use sustainable_planner::config::PlannerConfig;
use sustainable_planner::presentation::StatusBoard;
use sustainable_planner::profile::UserProfile;
use sustainable_planner::service::PlanService;
use sustainable_planner::web::planner_routes;

#[derive(Debug, Parser)]
#[command(name = "sustainable-planner", version, about = "🌱 Sustainable Life Planner")]
struct Cli {
    /// Directory of knowledge documents read by the first agent.
    #[arg(long, global = true)]
    knowledge_dir: Option<PathBuf>,

    /// Model name passed to the provider.
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the web form (default).
    Serve {
        /// Port to listen on.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Generate one plan in the terminal.
    Plan {
        #[arg(long, default_value = sustainable_planner::profile::EXAMPLE_TRANSPORTATION)]
        transportation: String,
        #[arg(long, default_value = sustainable_planner::profile::EXAMPLE_DIET)]
        diet: String,
        #[arg(long, default_value = sustainable_planner::profile::EXAMPLE_ENERGY_USAGE)]
        energy_usage: String,
        #[arg(long, default_value = sustainable_planner::profile::EXAMPLE_GOALS)]
        goals: String,
        /// Print every agent's output instead of only the final plan.
        #[arg(long)]
        trace: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = PlannerConfig::from_env()?;
    if let Some(dir) = cli.knowledge_dir {
        config.knowledge_dir = dir;
    }
    if let Some(model) = cli.model {
        config.llm.model = model;
    }

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            serve(config).await
        }
        Command::Plan {
            transportation,
            diet,
            energy_usage,
            goals,
            trace,
        } => {
            let profile = UserProfile {
                transportation: Some(transportation),
                diet: Some(diet),
                energy_usage: Some(energy_usage),
                goals: Some(goals),
            };
            plan_once(config, profile, trace).await
        }
    }
}

async fn serve(config: PlannerConfig) -> anyhow::Result<()> {
    eprintln!("🌱 Sustainable Life Planner v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {} ({})", config.llm.model, config.llm.backend.label());
    eprintln!("   Knowledge: {}", config.knowledge_dir.display());
    eprintln!("   UI: http://0.0.0.0:{}/", config.port);
    eprintln!("   Progress WS: ws://0.0.0.0:{}/ws", config.port);
    eprintln!("   API: http://0.0.0.0:{}/api/plan\n", config.port);

    let service = Arc::new(PlanService::from_config(&config)?);
    if !service.has_credential() {
        eprintln!(
            "   Warning: {} not set, plan requests will be rejected\n",
            config.llm.credential_env_var()
        );
    }

    let app = planner_routes(service);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Planner server started");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn plan_once(config: PlannerConfig, profile: UserProfile, trace: bool) -> anyhow::Result<()> {
    let rule = "=".repeat(60);
    eprintln!("🌱 Sustainable Life Planner\n");
    eprintln!("{rule}");
    eprintln!("User Profile:");
    for (key, value) in profile.summary() {
        eprintln!("  {key}: {value}");
    }
    eprintln!("{rule}");
    eprintln!("\n🤖 AI Agents are working on your sustainable life plan...\n");

    let service = PlanService::from_config(&config)?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        let mut board = StatusBoard::new();
        while let Some(event) = rx.recv().await {
            board.apply(event);
            eprintln!("   {}", board.render_line());
        }
    });

    let outcome = service.generate(&profile, Some(&tx)).await;
    drop(tx);
    let _ = printer.await;

    match outcome {
        Ok(plan) => {
            eprintln!("\n{rule}");
            eprintln!("📋 YOUR SUSTAINABLE LIFE PLAN");
            eprintln!("{rule}");
            let mut stdout = std::io::stdout().lock();
            if trace {
                writeln!(stdout, "{}", plan.trace())?;
            } else {
                writeln!(stdout, "{plan}")?;
            }
            eprintln!(
                "\n   Tokens: {} in / {} out, est. ${}",
                plan.usage.input_tokens,
                plan.usage.output_tokens,
                plan.estimated_cost_usd.round_dp(4)
            );
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", err.user_message());
            if let Some(hint) = err.hint() {
                eprintln!("{hint}");
            }
            std::process::exit(1);
        }
    }
}
