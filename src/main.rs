#![forbid(unsafe_code)]

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{Level as TraceLevel, info};
use tracing_subscriber::FmtSubscriber;

use tipwheel::config::Settings;
use tipwheel::persistence::JsonFileStore;
use tipwheel::presenter::{self, ConsolePresenter, Presenter, WriterSink};
use tipwheel::version::Gate;
use tipwheel::{Pick, TipService};

#[derive(Parser, Debug)]
#[command(name = "tipwheel", version, about = "Show a tip of the day, never repeating one until all have been seen")]
struct Cli {
    /// Settings file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Tip resource to read instead of the configured one
    #[arg(long, global = true)]
    tips: Option<PathBuf>,

    /// Session state file to use instead of the configured one
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Running application version used for version gates
    #[arg(long = "app-version", global = true)]
    app_version: Option<String>,

    /// Seed for a reproducible pick
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Show the next tip
    Show {
        /// Also print the tip's command script
        #[arg(long)]
        run: bool,
    },
    /// Show the next tip if tips at startup are enabled
    Startup {
        /// Also print the tip's command script
        #[arg(long)]
        run: bool,
    },
    /// Show the last tip again
    Current {
        /// Also print the tip's command script
        #[arg(long)]
        run: bool,
    },
    /// List every tip with its eligibility
    List,
    /// Report problems in the tip resource
    Check,
    /// Start a new cycle
    Reset,
    /// Show tips at startup
    Enable,
    /// Do not show tips at startup
    Disable,
}

type Service = TipService<JsonFileStore, StdRng>;

fn init_logging(settings: &Settings) -> Result<()> {
    // LOG_LEVEL wins over the settings file
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| settings.log_level.clone())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    // stdout carries tips and scripts only
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")
}

fn open_service(cli: &Cli, settings: &Settings) -> Service {
    let mut settings = settings.clone();
    if let Some(tips) = &cli.tips {
        settings.tips_path = Some(tips.clone());
    }
    if let Some(state) = &cli.state {
        settings.state_path = Some(state.clone());
    }
    if let Some(version) = &cli.app_version {
        settings.app_version = Some(version.clone());
    }

    let rng = cli
        .seed
        .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

    TipService::open(
        &settings.tip_source(),
        settings.running_version(),
        settings.session_store(),
        rng,
    )
}

fn present(pick: Pick<'_>, run: bool) -> Result<()> {
    let stdout = std::io::stdout();
    ConsolePresenter::new(stdout.lock()).present(pick.index, pick.entry)?;
    if run {
        let mut sink = WriterSink::new(stdout.lock());
        if !presenter::run_action(pick.entry, &mut sink)? {
            info!(index = pick.index, "Tip has no command to run");
        }
    }
    Ok(())
}

fn show_next(service: &mut Service, run: bool) -> Result<()> {
    match service.next() {
        Ok(pick) => present(pick, run),
        Err(reason) => {
            info!(reason = %reason, "No tip to show");
            Ok(())
        }
    }
}

fn list(service: &Service) -> Result<()> {
    let mut out = std::io::stdout().lock();
    writeln!(out, "running version {}", service.running_version())?;
    for (index, entry, gate) in service.gates() {
        let status = match gate {
            Gate::TooOld => "gated",
            _ if service.state().has_shown(index) => "seen",
            _ => "ready",
        };
        let action = if entry.has_action() { "cmd" } else { "-" };
        let version = entry.min_version.as_deref().unwrap_or("*");
        let first_line = entry.display_text();
        let first_line = first_line.lines().next().unwrap_or_default();
        writeln!(out, "{:>3}  {status:<5}  {action:<3}  {version:<8}  {first_line}", index + 1)?;
    }
    Ok(())
}

fn check(service: &Service) -> Result<ExitCode> {
    let mut out = std::io::stdout().lock();
    if !service.is_available() {
        writeln!(out, "tip resource could not be read")?;
        return Ok(ExitCode::FAILURE);
    }

    for diagnostic in service.diagnostics() {
        writeln!(out, "warning: {diagnostic}")?;
    }
    let skipped = service.skipped();
    writeln!(
        out,
        "{} tips, {} eligible for {}, {} skipped",
        service.database().len(),
        service.eligible_count(),
        service.running_version(),
        skipped
    )?;

    Ok(if skipped > 0 { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn set_startup(path: &std::path::Path, settings: &Settings, enabled: bool) -> Result<()> {
    let mut settings = settings.clone();
    settings.show_on_startup = enabled;
    settings.save(path)?;
    println!("tips at startup {}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Settings::default_path);
    let (settings, issues) = Settings::load(&config_path)?;
    init_logging(&settings)?;
    for issue in &issues {
        issue.report();
    }

    let command = cli.command.unwrap_or(Command::Show { run: false });
    match command {
        Command::Show { run } => show_next(&mut open_service(&cli, &settings), run)?,
        Command::Startup { run } => {
            if settings.show_on_startup {
                show_next(&mut open_service(&cli, &settings), run)?;
            } else {
                info!("Tips at startup are disabled");
            }
        }
        Command::Current { run } => {
            let service = open_service(&cli, &settings);
            match service.current() {
                Some(pick) => present(pick, run)?,
                None => info!("No tip has been shown in this cycle"),
            }
        }
        Command::List => list(&open_service(&cli, &settings))?,
        Command::Check => return check(&open_service(&cli, &settings)),
        Command::Reset => {
            open_service(&cli, &settings)
                .reset()
                .context("Failed to clear session state")?;
            println!("tip cycle reset");
        }
        Command::Enable => set_startup(&config_path, &settings, true)?,
        Command::Disable => set_startup(&config_path, &settings, false)?,
    }

    Ok(ExitCode::SUCCESS)
}
