//! lmreap - list and reap floating license sessions
//!
//! Queries a FlexNet license server for the sessions holding one feature,
//! shows them as a numbered table and removes the sessions the operator
//! picks. The cycle repeats until the operator answers "no".
//!
//! Usage:
//! ```bash
//! # Server from the environment, lmutil from UGII_BASE_DIR or PATH
//! SPLM_LICENSE_SERVER=28000@lic01 lmreap
//!
//! # Another feature, keeping a copy of every status report
//! lmreap --server 28000@lic01 --feature nx_mach_token --report-path ~/lmstat.txt
//!
//! # With a config file (env vars and flags override it)
//! lmreap --config lmreap.yaml
//! ```
//!
//! Exit codes: 0 when the operator finishes, 2 when nobody holds the
//! feature, 1 on any fatal error including Ctrl-C.

mod archive;
mod config;
mod lmutil;

use archive::ReportArchive;
use clap::Parser;
use config::{ReaperConfig, expand_path};
use lmreap_core::{OperatorSession, SessionOutcome};
use lmutil::LmutilGateway;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const SECTION_RULE: &str = "\n------------------\n";

const BANNER: &str = "Kick NX Token users utility";

/// lmreap - floating license session reaper
#[derive(Debug, Parser)]
#[command(name = "lmreap")]
#[command(
    about = "List the sessions holding a license feature and forcibly remove selected ones",
    long_about = None
)]
struct Cli {
    /// Path to configuration file (YAML or TOML)
    #[arg(short, long, value_name = "FILE", env = "LMREAP_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the lmutil executable (default: UGII_BASE_DIR/UGFLEXLM, then PATH)
    #[arg(long, value_name = "PATH")]
    lmutil: Option<PathBuf>,

    /// License server address, e.g. 28000@lic01
    #[arg(short, long, value_name = "PORT@HOST")]
    server: Option<String>,

    /// License feature to list and reap
    #[arg(short, long, value_name = "FEATURE")]
    feature: Option<String>,

    /// Save every raw status report to this file
    #[arg(long, value_name = "FILE")]
    report_path: Option<PathBuf>,

    /// Seconds to wait before exiting when nothing was done or on error
    #[arg(long, value_name = "SECS")]
    exit_pause: Option<u64>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    /// Flags take precedence over file and environment values
    fn apply(&self, config: &mut ReaperConfig) {
        if let Some(path) = &self.lmutil {
            config.lmutil_path = Some(path.clone());
        }
        if let Some(server) = &self.server {
            config.server = Some(server.clone());
        }
        if let Some(feature) = &self.feature {
            config.feature = feature.clone();
        }
        if let Some(path) = &self.report_path {
            config.report_path = Some(path.clone());
        }
        if let Some(secs) = self.exit_pause {
            config.exit_pause_secs = secs;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

/// Terminal outcome of one lmreap run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Completed,
    NothingToDo,
    Fatal,
}

impl Exit {
    fn code(self) -> u8 {
        match self {
            Exit::Completed => 0,
            Exit::Fatal => 1,
            Exit::NothingToDo => 2,
        }
    }

    /// Whether to hold the console open before exiting
    fn pauses(self) -> bool {
        self != Exit::Completed
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(Exit::Fatal.code());
        }
    };

    if let Err(e) = init_tracing(&config.logging.level) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let exit_pause_secs = config.exit_pause_secs;
    if let Err(e) = ctrlc::set_handler(move || {
        exit_on_interrupt(exit_pause_secs);
    }) {
        warn!(error = %e, "Failed to install interrupt handler");
    }

    let exit = run(&config);

    if exit.pauses() && config.exit_pause_secs > 0 {
        std::thread::sleep(Duration::from_secs(config.exit_pause_secs));
    }
    ExitCode::from(exit.code())
}

/// Outcome of an operator interrupt at any point of the session
fn interrupt_exit() -> Exit {
    Exit::Fatal
}

/// Runs on the interrupt handler thread. The main thread holds the stdout
/// lock while it waits for input, so the diagnostic goes to stderr.
fn exit_on_interrupt(exit_pause_secs: u64) -> ! {
    let exit = interrupt_exit();
    error!("Interrupted by operator");
    eprintln!("\nError: Interrupted by operator");

    if exit.pauses() && exit_pause_secs > 0 {
        std::thread::sleep(Duration::from_secs(exit_pause_secs));
    }
    std::process::exit(i32::from(exit.code()))
}

fn load_config(cli: &Cli) -> anyhow::Result<ReaperConfig> {
    let mut config = match &cli.config {
        Some(path) => ReaperConfig::from_file(expand_path(path))?,
        None => ReaperConfig::default(),
    };
    config.merge_env();
    cli.apply(&mut config);
    Ok(config)
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    // Logs go to stderr so the session table on stdout stays readable
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn run(config: &ReaperConfig) -> Exit {
    println!("{}", SECTION_RULE);
    println!("{}", BANNER);
    println!("{}", SECTION_RULE);
    println!("Startup checks");

    let ugii_base_dir = std::env::var_os("UGII_BASE_DIR").map(PathBuf::from);
    let path_var = std::env::var_os("PATH");

    let context = match config.resolve(ugii_base_dir.as_deref(), path_var.as_deref()) {
        Ok(context) => context,
        Err(e) => {
            error!(error = %e, "Startup checks failed");
            println!("{}", e);
            return Exit::Fatal;
        }
    };

    println!("lmutil found at {}", context.lmutil_path.display());
    println!("License server set to {}", context.server);
    println!("Startup checks complete");
    info!(
        lmutil = %context.lmutil_path.display(),
        server = %context.server,
        feature = %context.feature,
        "Startup checks complete"
    );

    let mut gateway = LmutilGateway::new();
    if let Some(path) = &config.report_path {
        gateway = gateway.with_archive(ReportArchive::new(expand_path(path)));
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let result = OperatorSession::new(&gateway, &context, stdin.lock(), stdout.lock()).run();

    match result {
        Ok(SessionOutcome::Completed) => {
            println!("License removal complete");
            Exit::Completed
        }
        Ok(SessionOutcome::NoActiveSessions) => Exit::NothingToDo,
        // The operator session already printed the diagnostic
        Err(_) => Exit::Fatal,
    }
}
