use super::*;
use crate::client::GenericClient;
use crate::test_support::{FakeClient, RecordingObserver};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_query_kind_detection() {
    assert_eq!(QueryKind::from_sql("SELECT * FROM users"), QueryKind::Select);
    assert_eq!(QueryKind::from_sql("  select * FROM users"), QueryKind::Select);
    assert_eq!(
        QueryKind::from_sql("INSERT INTO users (name) VALUES ($1)"),
        QueryKind::Insert
    );
    assert_eq!(QueryKind::from_sql("(SELECT 1)"), QueryKind::Select);
    assert_eq!(QueryKind::from_sql("DELETE FROM users"), QueryKind::Delete);
    assert_eq!(QueryKind::from_sql("CREATE TABLE t (id INT)"), QueryKind::Other);
    assert_eq!(QueryKind::from_sql(""), QueryKind::Other);
}

#[test]
fn test_tracing_observer_truncation() {
    let observer = TracingObserver::new().max_sql_length(10);
    assert_eq!(observer.truncate_sql("SELECT * FROM users"), "SELECT * F...");
    assert_eq!(observer.truncate_sql("SELECT 1"), "SELECT 1");
    assert_eq!(
        TracingObserver::new().no_truncate().truncate_sql(&"x".repeat(500)).len(),
        500
    );
}

#[test]
fn test_error_outcome_is_truncated() {
    let outcome = QueryOutcome::error("é".repeat(400));
    match outcome {
        QueryOutcome::Error(msg) => {
            assert!(msg.ends_with("..."));
            assert!(msg.len() <= 515);
        }
        other => panic!("expected error outcome, got {other:?}"),
    }
}

#[tokio::test]
async fn test_success_is_reported_with_tag() {
    let observer = Arc::new(RecordingObserver::default());
    let client = ObservedClient::new(FakeClient::empty()).with_observer_arc(observer.clone());

    let rows = client
        .query_tagged("users.by_id", "SELECT * FROM users WHERE id = $1;", &[&1_i32])
        .await
        .unwrap();
    assert!(rows.is_empty());

    let completed = observer.completed();
    assert_eq!(completed.len(), 1);
    let (ctx, outcome) = &completed[0];
    assert_eq!(ctx.tag.as_deref(), Some("users.by_id"));
    assert_eq!(ctx.kind, QueryKind::Select);
    assert_eq!(ctx.param_count, 1);
    assert_eq!(outcome, &QueryOutcome::Rows(0));
}

#[tokio::test]
async fn test_failure_is_reported_and_returned() {
    let observer = Arc::new(RecordingObserver::default());
    let client =
        ObservedClient::new(FakeClient::failing("connection refused")).with_observer_arc(observer.clone());

    let err = client.query_opt("SELECT 1;", &[]).await.unwrap_err();
    assert!(err.to_string().contains("connection refused"));

    let completed = observer.completed();
    assert_eq!(completed.len(), 1);
    assert!(completed[0].1.is_error());
}

#[tokio::test]
async fn test_optional_row_outcome() {
    let observer = Arc::new(RecordingObserver::default());
    let client = ObservedClient::new(FakeClient::empty()).with_observer_arc(observer.clone());

    assert!(client.query_opt("SELECT 1;", &[]).await.unwrap().is_none());
    assert_eq!(observer.completed()[0].1, QueryOutcome::OptionalRow(false));
}

#[tokio::test]
async fn test_slow_query_threshold() {
    let observer = Arc::new(RecordingObserver::default());
    let client = ObservedClient::new(FakeClient::slow(Duration::from_millis(20)))
        .with_observer_arc(observer.clone())
        .with_slow_query_threshold(Some(Duration::from_millis(5)));
    client.query("SELECT 1;", &[]).await.unwrap();
    assert_eq!(*observer.slow.lock().unwrap(), vec!["SELECT 1;".to_string()]);

    let quiet = Arc::new(RecordingObserver::default());
    let client = ObservedClient::new(FakeClient::empty())
        .with_observer_arc(quiet.clone())
        .with_slow_query_threshold(Some(Duration::from_secs(60)));
    client.query("SELECT 2;", &[]).await.unwrap();
    assert!(quiet.slow.lock().unwrap().is_empty());
    assert_eq!(quiet.completed().len(), 1);
}

#[tokio::test]
async fn test_noop_observer_passes_results_through() {
    let client = ObservedClient::new(FakeClient::empty()).with_observer(NoopObserver);
    assert!(client.query("SELECT 1;", &[]).await.unwrap().is_empty());
    assert_eq!(client.inner().calls(), vec![("SELECT 1;".to_string(), 0)]);
}
