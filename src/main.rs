mod config;
mod context;
mod errors;
mod executors;
mod extractors;
mod loader;
mod matcher;
mod protocol;
mod report;
mod request;
mod runner;
mod telemetry;
mod validation;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;
use clap::Parser;
use colored::Colorize;

use config::RunnerConfig;
use executors::{ReqwestTransport, TestExecutor};
use report::ConsoleObserver;
use runner::Runner;
use telemetry::TelemetryConfig;
use validation::ValidationError;

#[derive(Parser)]
#[command(name = "apitester", version)]
#[command(about = "Runs declarative API test suites sequentially", long_about = None)]
struct Cli {
    /// Path to the suite file (JSON with a `test_case` list)
    config: PathBuf,

    /// Prefix for every test case endpoint
    #[arg(long)]
    base_url: Option<String>,

    /// Stop at the first failed test case
    #[arg(long)]
    stop_on_failure: bool,

    /// Path to the JSON report file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Timeout for test cases that do not define one
    #[arg(long, value_name = "SECS")]
    default_timeout: Option<u64>,

    /// Log level when RUST_LOG is not set (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    /// Environment first, flags on top.
    fn runner_config(&self) -> RunnerConfig {
        let mut config = RunnerConfig::from_env();

        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.clone());
        }
        if self.stop_on_failure {
            config.stop_on_failure = true;
        }
        if let Some(secs) = self.default_timeout.filter(|secs| *secs > 0) {
            config.default_timeout = Duration::from_secs(secs);
        }

        config
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(&cli).await {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red(), e);
            1
        }
    };

    telemetry::shutdown_telemetry();
    std::process::exit(code);
}

/// `[E1001] <message> (<category>: <description>)`
fn config_error_line(error: &ValidationError) -> String {
    let code = error.code();
    format!(
        "[{}] {} ({}: {})",
        code,
        error,
        code.category(),
        code.description()
    )
}

/// Returns whether every executed test case passed.
async fn run(cli: &Cli) -> anyhow::Result<bool> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut telemetry_config = TelemetryConfig::from_env();
    if let Some(level) = &cli.log_level {
        telemetry_config = telemetry_config.with_log_level(level)?;
    }
    telemetry::init_telemetry(telemetry_config)?;

    let config = cli.runner_config();
    tracing::debug!(?config, "Runner configuration");

    // 1. Load + validate
    let cases = loader::load_suite_from_file(&cli.config)?;
    println!("{}", format!("✓ Loaded {} test cases", cases.len()).green());

    if let Err(errors) = validation::validate_suite(&cases) {
        for error in &errors {
            eprintln!("{} {}", "✗".red(), config_error_line(error));
        }
        return Err(anyhow!("{} configuration error(s) in {:?}", errors.len(), cli.config));
    }

    // 2. Execute
    let executor = TestExecutor::new(Box::new(ReqwestTransport::new()), config.base_url.clone())
        .with_default_timeout(config.default_timeout);
    let runner = Runner::new(executor, config.stop_on_failure);

    let mut console = ConsoleObserver::new();
    let outcome = runner.run(&cases, &mut console).await;

    report::print_summary(&outcome.summary);
    tracing::debug!(variables = outcome.variables.len(), "Variables at end of run");

    // 3. Export (failure is reported but does not change the exit code)
    if let Some(path) = &cli.output {
        let report = report::build_report(
            &outcome,
            &cli.config.to_string_lossy(),
            &config.base_url,
        );
        match report::export_report(&report, path) {
            Ok(()) => println!(
                "{}",
                format!("✓ Results exported to: {}", path.display()).green()
            ),
            Err(e) => eprintln!("{} {:#}", "✗".red(), e),
        }
    }

    Ok(outcome.all_passed())
}
