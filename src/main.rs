use clap::Parser;
use race_backfill::domain::ports::Reporter;
use race_backfill::utils::validation::Validate;
use race_backfill::utils::{logger, signal};
use race_backfill::{BackfillDriver, CliConfig, ConsoleReporter, HttpUpdateClient, Result};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose, config.log_format);

    tracing::info!("Starting race-backfill");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // run() 回來時 scratch 已釋放，之後才決定 exit code
    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_interrupted() {
                tracing::warn!("🛑 {}", e);
            } else {
                tracing::error!("❌ Backfill failed: {}", e);
            }
            eprintln!("❌ {}", e);
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(config: &CliConfig) -> Result<()> {
    config.validate()?;
    let run = config.resolve()?;
    let mut reporter = ConsoleReporter::stdio(config.output_format);
    let client = HttpUpdateClient::new(&run.config)?;
    let driver = BackfillDriver::new(client, run.config.clone());

    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No requests will be sent");
        reporter.run_started(&run.config, &run.dates)?;
        for (index, url) in driver.plan(&run.dates).iter().enumerate() {
            println!("[{}/{}] would POST {}", index + 1, run.dates.len(), url);
        }
        return Ok(());
    }

    let summary = driver
        .run_until(&run.dates, &mut reporter, signal::shutdown_signal())
        .await?;

    // 全部失敗也回 0，只靠摘要與警告呈現
    if summary.total() > 0 && summary.accepted() == 0 {
        tracing::warn!(
            "⚠️ None of the {} dates were accepted; check the service before re-running",
            summary.total()
        );
    }

    Ok(())
}
