// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, warn};
use std::io::Write;
use std::path::PathBuf;

use transub::app_config::{Config, EngineProvider, LogLevel};
use transub::app_controller::Controller;
use transub::database::models::JobType;

/// CLI wrapper for EngineProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliEngineProvider {
    Mock,
    Openai,
}

impl From<CliEngineProvider> for EngineProvider {
    fn from(cli_provider: CliEngineProvider) -> Self {
        match cli_provider {
            CliEngineProvider::Mock => EngineProvider::Mock,
            CliEngineProvider::Openai => EngineProvider::OpenAi,
        }
    }
}

/// CLI wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the job scheduler loop until interrupted
    Serve {
        /// Override the poll interval in milliseconds
        #[arg(long)]
        poll_interval_ms: Option<u64>,
    },

    /// Import an SRT file as a new project
    Import {
        /// Subtitle file to import
        file: PathBuf,

        /// Project display name (defaults to the file stem)
        #[arg(short, long)]
        name: Option<String>,

        /// Source language code (e.g., 'en', 'eng')
        #[arg(short, long, default_value = "en")]
        source_lang: String,

        /// Target language code (e.g., 'fi', 'fin')
        #[arg(short, long, default_value = "fi")]
        target_lang: String,

        /// Enqueue a translate job right away
        #[arg(long)]
        translate: bool,
    },

    /// Enqueue a job for an existing project
    Enqueue {
        /// Project id
        project: i64,

        /// Job type: translate or consistency
        job_type: String,
    },

    /// Export a project's current segment state as SRT
    Export {
        /// Project id
        project: i64,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List a project's jobs
    Jobs {
        /// Project id
        project: i64,
    },

    /// Show the monthly usage ledger
    Usage {
        /// Month as YYYY-MM (current month when omitted)
        #[arg(short, long)]
        month: Option<String>,
    },
}

/// transub - subtitle translation job pipeline
///
/// Imports subtitle files, batch-translates them with an AI engine, and runs
/// cross-segment consistency passes, tracking per-job progress and cost.
#[derive(Parser, Debug)]
#[command(name = "transub")]
#[command(version = "0.3.0")]
#[command(about = "AI subtitle translation job pipeline")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database file path (defaults to the user data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Translation engine to use
    #[arg(short, long, value_enum, global = true)]
    engine: Option<CliEngineProvider>,

    /// API key for the network engine
    #[arg(long, env = "TRANSUB_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CommandLineOptions::parse();

    // Load config first so its log level applies unless overridden on the CLI
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(engine) = cli.engine {
        config.engine.provider = engine.into();
    }
    if let Some(api_key) = cli.api_key {
        config.engine.api_key = api_key;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }

    if let Err(e) = CustomLogger::init(config.log_level.to_level_filter()) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    if let Commands::Serve {
        poll_interval_ms: Some(interval),
    } = &cli.command
    {
        config.poll_interval_ms = *interval;
    }

    let controller = Controller::new(config.clone(), cli.db.as_deref())?;

    match cli.command {
        Commands::Serve { .. } => controller.serve().await,
        Commands::Import {
            file,
            name,
            source_lang,
            target_lang,
            translate,
        } => {
            let project_id = controller
                .import(&file, name, &source_lang, &target_lang, translate)
                .await?;
            println!("{}", project_id);
            if translate && config.engine.provider == EngineProvider::Mock {
                warn!("Translate job enqueued against the mock engine; run serve with --engine openai for real output");
            }
            Ok(())
        }
        Commands::Enqueue { project, job_type } => {
            let job_type: JobType = job_type.parse()?;
            let job_id = controller.enqueue(project, job_type).await?;
            println!("{}", job_id);
            Ok(())
        }
        Commands::Export { project, out } => controller.export(project, out).await,
        Commands::Jobs { project } => controller.print_jobs(project).await,
        Commands::Usage { month } => controller.print_usage(month).await,
    }
}
