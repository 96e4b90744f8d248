//! # Batch Runner Tests
//!
//! End-to-end pipeline tests: fetch against a wiremock GreyNoise, normalize,
//! and persist into an in-memory store, asserting the per-IP outcomes and the
//! continue-past-failures contract.

use anyhow::Result;
use greywire::{BatchRunner, Config, Fetcher, OutcomeStatus};
use greywire_test_utils::{riot_record, RecordingSleeper, TestSetup};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: &str) -> Config {
    Config {
        base_url: base_url.to_string(),
        max_retries: 2,
        initial_backoff: Duration::from_millis(5),
        request_timeout: Duration::from_secs(2),
        ..Default::default()
    }
}

async fn test_runner(server: &MockServer) -> Result<(BatchRunner, TestSetup)> {
    let setup = TestSetup::new().await?;
    let fetcher = Fetcher::with_sleeper(
        &test_config(&server.uri()),
        Arc::new(RecordingSleeper::new()),
    )?;
    let runner = BatchRunner::new(fetcher, setup.store.clone());
    Ok((runner, setup))
}

fn ips(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_found_and_not_found_outcomes() -> Result<()> {
    // --- Arrange ---
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/ip/8.8.8.8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(riot_record("8.8.8.8")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/ip/9.9.9.9"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let (runner, setup) = test_runner(&server).await?;

    // --- Act ---
    let summary = runner.run(&ips(&["8.8.8.8", "9.9.9.9"]), false).await;

    // --- Assert ---
    assert_eq!(summary.len(), 2);
    assert_eq!(summary.outcomes[0].ip, "8.8.8.8");
    assert_eq!(summary.outcomes[0].status, OutcomeStatus::Inserted);
    assert_eq!(summary.outcomes[1].ip, "9.9.9.9");
    assert_eq!(summary.outcomes[1].status, OutcomeStatus::NotFound);
    // Only the found IP produced a document.
    assert_eq!(setup.count_documents().await?, 1);
    Ok(())
}

#[tokio::test]
async fn test_fetch_failure_never_aborts_the_batch() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/ip/5.5.5.5"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/ip/8.8.8.8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(riot_record("8.8.8.8")))
        .mount(&server)
        .await;
    let (runner, setup) = test_runner(&server).await?;

    let summary = runner.run(&ips(&["5.5.5.5", "8.8.8.8"]), false).await;

    assert_eq!(summary.outcomes[0].status, OutcomeStatus::Error);
    assert!(summary.outcomes[0]
        .error
        .as_deref()
        .unwrap()
        .contains("500"));
    // The later IP was still processed.
    assert_eq!(summary.outcomes[1].status, OutcomeStatus::Inserted);
    assert_eq!(setup.count_documents().await?, 1);
    Ok(())
}

#[tokio::test]
async fn test_rate_limit_exhaustion_is_an_error_outcome() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/ip/1.1.1.1"))
        .respond_with(ResponseTemplate::new(429))
        .expect(2)
        .mount(&server)
        .await;
    let (runner, setup) = test_runner(&server).await?;

    let summary = runner.run(&ips(&["1.1.1.1"]), false).await;

    assert_eq!(summary.outcomes[0].status, OutcomeStatus::Error);
    assert_eq!(setup.count_documents().await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_dry_run_never_writes_to_the_store() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/ip/8.8.8.8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(riot_record("8.8.8.8")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/ip/9.9.9.9"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let (runner, setup) = test_runner(&server).await?;

    let summary = runner.run(&ips(&["8.8.8.8", "9.9.9.9"]), true).await;

    assert_eq!(summary.outcomes[0].status, OutcomeStatus::DryRun);
    assert_eq!(summary.outcomes[1].status, OutcomeStatus::NotFound);
    assert_eq!(setup.count_documents().await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_blank_input_entries_are_skipped_silently() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/ip/8.8.8.8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(riot_record("8.8.8.8")))
        .mount(&server)
        .await;
    let (runner, _setup) = test_runner(&server).await?;

    let summary = runner.run(&ips(&["  ", "8.8.8.8", ""]), false).await;

    // Blank entries yield no summary rows at all.
    assert_eq!(summary.len(), 1);
    assert_eq!(summary.outcomes[0].status, OutcomeStatus::Inserted);
    Ok(())
}
