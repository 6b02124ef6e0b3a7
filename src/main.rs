use anyhow::Context;
use clap::Parser;
use code_exec::EXIT_FAILURE;
use sandbox_runner::{run, RunnerConfig, DEFAULT_USAGE_FILE};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Sandbox working directory
    #[arg(long, default_value = "/work")]
    workdir: PathBuf,

    /// Usage record, relative to the working directory
    #[arg(long, default_value = DEFAULT_USAGE_FILE)]
    usage_file: PathBuf,

    /// Also write the full result as JSON
    #[arg(long)]
    result_file: Option<PathBuf>,

    /// Compile-phase wall-clock budget in milliseconds
    #[arg(long, default_value = "10000")]
    compile_timeout_ms: u64,

    /// Write logs here instead of discarding them
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
    // stderr belongs to the child, so logging is off unless sent to a file
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "off".into()))
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref())?;

    let config = RunnerConfig {
        usage_file: args.usage_file,
        result_file: args.result_file,
        compile_timeout: Duration::from_millis(args.compile_timeout_ms),
        ..RunnerConfig::new(args.workdir)
    };

    let stdin = std::io::stdin();
    let (mut stdout, mut stderr) = (std::io::stdout(), std::io::stderr());
    match run(&config, stdin.lock(), &mut stdout, &mut stderr).await {
        Ok(status) => Ok(ExitCode::from(status.exit_code())),
        Err(e) => {
            error!("Runner failed: {}", e);
            eprintln!("sandbox-runner: {}", e);
            Ok(ExitCode::from(EXIT_FAILURE))
        }
    }
}
