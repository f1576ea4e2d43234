use std::path::Path;

use httpmock::prelude::*;
use scanvault_app::{Cli, run_archive};
use scanvault_core::ScanId;
use scanvault_test_support::fixtures::{report_document, run_date};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

fn cli_for(server: &MockServer, archive: &Path) -> Cli {
    Cli {
        username: Some("scanner".to_string()),
        password: Some("secret".to_string()),
        destination: Some(format!("file://{}", archive.display())),
        base_url: Some(format!("{}/qps/rest/3.0", server.base_url())),
        date: Some(run_date()),
        max_attempts: Some(1),
        key_prefix: Some("qualys".to_string()),
        ..Cli::default()
    }
}

fn mock_listing<'a>(server: &'a MockServer, ids: &[u64]) -> httpmock::Mock<'a> {
    let data: Vec<Value> = ids.iter().map(|id| json!({"WasScan": {"id": id}})).collect();
    server.mock(|when, then| {
        when.method(POST).path("/qps/rest/3.0/search/was/wasscan");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "ServiceResponse": {"responseCode": "SUCCESS", "data": data}
            }));
    })
}

fn mock_report<'a>(server: &'a MockServer, id: &str) -> httpmock::Mock<'a> {
    let document = report_document(&ScanId::from(id));
    let path = format!("/qps/rest/3.0/download/was/wasscan/{id}");
    server.mock(move |when, then| {
        when.method(GET).path(path);
        then.status(200)
            .header("content-type", "application/json")
            .json_body(document);
    })
}

#[tokio::test]
async fn archives_every_finished_scan_to_the_directory() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let archive = tempfile::tempdir()?;
    let listing = mock_listing(&server, &[40_012, 40_013, 40_014]);
    let first = mock_report(&server, "40012");
    let second = mock_report(&server, "40013");
    let missing = server.mock(|when, then| {
        when.method(GET).path("/qps/rest/3.0/download/was/wasscan/40014");
        then.status(404);
    });

    let summary = run_archive(&cli_for(&server, archive.path()), CancellationToken::new()).await?;

    listing.assert();
    first.assert();
    second.assert();
    missing.assert();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.archived, 2);
    assert_eq!(summary.download_failed, 1);
    let failed: Vec<&str> = summary.failed_ids().into_iter().map(ScanId::as_str).collect();
    assert_eq!(failed, ["40014"]);

    for id in ["40012", "40013"] {
        let bytes = tokio::fs::read(archive.path().join(format!("qualys/{id}.json"))).await?;
        let stored: Value = serde_json::from_slice(&bytes)?;
        assert_eq!(stored, report_document(&ScanId::from(id)));
    }
    assert!(!archive.path().join("qualys/40014.json").exists());
    Ok(())
}

#[tokio::test]
async fn empty_day_is_a_clean_run() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let archive = tempfile::tempdir()?;
    let listing = mock_listing(&server, &[]);

    let summary = run_archive(&cli_for(&server, archive.path()), CancellationToken::new()).await?;

    listing.assert();
    assert_eq!(summary.total, 0);
    assert!(summary.is_clean());
    Ok(())
}

#[tokio::test]
async fn missing_settings_abort_before_any_request() {
    let server = MockServer::start_async().await;
    let listing = server.mock(|when, then| {
        when.method(POST).path("/search/was/wasscan");
        then.status(200);
    });
    let cli = Cli {
        password: Some("secret".to_string()),
        base_url: Some(server.base_url()),
        ..Cli::default()
    };

    let err = run_archive(&cli, CancellationToken::new())
        .await
        .expect_err("configuration must be rejected");

    assert_eq!(err.exit_code(), 2);
    assert!(err.display_message().contains("QUALYS_USERNAME, S3_BUCKET_NAME"));
    listing.assert_calls(0);
}

#[tokio::test]
async fn malformed_destination_is_a_configuration_error() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let archive = tempfile::tempdir()?;
    let cli = Cli {
        destination: Some("scan archive".to_string()),
        ..cli_for(&server, archive.path())
    };

    let err = run_archive(&cli, CancellationToken::new())
        .await
        .expect_err("destination must be rejected");

    assert_eq!(err.exit_code(), 2);
    Ok(())
}

#[tokio::test]
async fn unavailable_listing_is_fatal() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let archive = tempfile::tempdir()?;
    let listing = server.mock(|when, then| {
        when.method(POST).path("/qps/rest/3.0/search/was/wasscan");
        then.status(503);
    });

    let err = run_archive(&cli_for(&server, archive.path()), CancellationToken::new())
        .await
        .expect_err("listing failure aborts the run");

    listing.assert();
    assert_eq!(err.exit_code(), 3);
    assert!(err.display_message().contains("scan listing unavailable"));
    assert!(std::fs::read_dir(archive.path())?.next().is_none());
    Ok(())
}
