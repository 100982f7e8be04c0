use anyhow::Result;
use clap::Parser;
use httpmock::prelude::*;
use race_backfill::{BackfillDriver, CliConfig, ConsoleReporter, HttpUpdateClient, OutputFormat};
use std::time::Duration;
use tempfile::TempDir;

/// 設定檔 + 日期檔 + 命令列日期，依序送出
#[tokio::test]
async fn test_config_file_and_dates_file_drive_the_run() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start_async().await;

    let expected = ["2024-01-06", "2024-01-07", "2024-01-13", "2024-01-06"];
    let mut mocks = Vec::new();
    for date in ["2024-01-06", "2024-01-07", "2024-01-13"] {
        mocks.push(
            server
                .mock_async(|when, then| {
                    when.method(POST)
                        .path("/api/races/update-results")
                        .query_param("target_date", date);
                    then.status(202).body(format!("queued {}", date));
                })
                .await,
        );
    }

    std::fs::write(
        temp_dir.path().join("dates.txt"),
        "# from the results audit\n2024-01-07\n2024-01-13\n",
    )?;
    let config_path = temp_dir.path().join("backfill.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[service]
base_url = "{}"
delay_seconds = 0
request_timeout_seconds = 5

[dates]
list = ["2024-01-06"]
file = "dates.txt"
"#,
            server.base_url()
        ),
    )?;

    let cli = CliConfig::try_parse_from([
        "race-backfill",
        "--config",
        config_path.to_str().unwrap(),
        "2024-01-06",
    ])?;
    let run = cli.resolve()?;

    assert_eq!(run.config.delay, Duration::ZERO);
    let rendered: Vec<String> = run.dates.iter().map(|d| d.to_string()).collect();
    assert_eq!(rendered, expected);

    let driver = BackfillDriver::new(HttpUpdateClient::new(&run.config)?, run.config.clone())
        .with_scratch_dir(temp_dir.path());
    let mut reporter = ConsoleReporter::new(Vec::new(), Vec::new(), OutputFormat::Json);
    let summary = driver.run(&run.dates, &mut reporter).await?;

    assert_eq!(summary.total(), 4);
    assert_eq!(summary.warnings(), 0);
    mocks[0].assert_hits_async(2).await;
    mocks[1].assert_hits_async(1).await;
    mocks[2].assert_hits_async(1).await;

    let (out, err) = reporter.into_inner();
    assert!(err.is_empty());
    let events: Vec<serde_json::Value> = String::from_utf8(out)?
        .lines()
        .map(serde_json::from_str)
        .collect::<std::result::Result<_, _>>()?;
    assert_eq!(events.len(), 6);
    assert_eq!(events[0]["event"], "config");
    let posted: Vec<&str> = events[1..5]
        .iter()
        .map(|e| e["date"].as_str().unwrap())
        .collect();
    assert_eq!(posted, expected);
    assert_eq!(events[2]["body"], "queued 2024-01-07");
    assert_eq!(events[5]["event"], "done");
    assert_eq!(events[5]["accepted"], 4);

    // 只剩設定檔與日期檔，scratch 已清掉
    let mut remaining: Vec<String> = std::fs::read_dir(temp_dir.path())?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<std::result::Result<_, _>>()?;
    remaining.sort();
    assert_eq!(remaining, vec!["backfill.toml", "dates.txt"]);
    Ok(())
}

#[test]
fn test_bad_date_in_dates_file_fails_before_any_request() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dates_path = temp_dir.path().join("dates.txt");
    std::fs::write(&dates_path, "2024-01-06\n2024-13-01\n")?;

    let cli = CliConfig::try_parse_from([
        "race-backfill",
        "--base-url",
        "http://localhost:8080",
        "--dates-file",
        dates_path.to_str().unwrap(),
    ])?;

    let err = cli.resolve().unwrap_err();
    assert_eq!(err.exit_code(), 1);
    assert!(err.to_string().contains("2024-13-01"));
    Ok(())
}
