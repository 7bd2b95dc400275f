use clap::Parser;
use sheet_splitter::progress::{render_scan, render_summary};
use sheet_splitter::{CliArgs, LoggingConfig, SplitConfig, init_logging, run_dry, run_split};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let logging_config = LoggingConfig::from_env();
    let _guard = init_logging(logging_config)?;

    let cli = CliArgs::parse();
    let config = SplitConfig::from_args(cli)?;

    // Fail fast before any worker starts
    config.validate()?;

    if config.dry_run {
        let json = config.json;
        let report = run_dry(config).await?;
        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("{}", render_scan(&report));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let json = config.json;
    let summary = run_split(config).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", render_summary(&summary));
    }

    Ok(ExitCode::from(summary.status.exit_code()))
}
