//! Integration tests for `CommandCollector` against real on-disk scripts.

mod helpers;

use helpers::scripts::{write_failing_script, write_script};
use logrow_exporter::collector::{Collector, CollectorError, CommandCollector};

#[tokio::test]
async fn collects_samples_from_command_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(
        dir.path(),
        "job.sh",
        r#"[{"namespace":"ns","pod_name":"p","container_log":"c","row_count":100},
           {"namespace":"ns","pod_name":"q","container_log":"c","row_count":5}]"#,
    );

    let samples = CommandCollector::new(path).collect().await.unwrap();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].namespace, "ns");
    assert_eq!(samples[0].pod_name, "p");
    assert_eq!(samples[0].container_log, "c");
    assert_eq!(samples[0].row_count, 100);
    assert_eq!(samples[1].row_count, 5);
}

#[tokio::test]
async fn tolerates_container_name_field_spelling() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(
        dir.path(),
        "job.sh",
        r#"[{"namespace":"ns","pod_name":"p","container_name":"legacy","row_count":1}]"#,
    );

    let samples = CommandCollector::new(path).collect().await.unwrap();
    assert_eq!(samples[0].container_log, "legacy");
}

#[tokio::test]
async fn execution_error_when_command_is_missing() {
    let collector = CommandCollector::new("/nonexistent/rowcount.sh");
    let err = collector.collect().await.unwrap_err();
    assert!(matches!(err, CollectorError::Execution { .. }));
}

#[tokio::test]
async fn execution_error_on_nonzero_exit() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_failing_script(dir.path(), "job.sh", 3);

    let err = CommandCollector::new(path).collect().await.unwrap_err();
    match err {
        CollectorError::Failed { status, .. } => assert_eq!(status.code(), Some(3)),
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn parse_error_on_malformed_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(dir.path(), "job.sh", "this is not json");

    let err = CommandCollector::new(path).collect().await.unwrap_err();
    assert!(matches!(err, CollectorError::Parse(_)));
}

#[tokio::test]
async fn parse_error_rejects_whole_batch_on_trailing_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(
        dir.path(),
        "job.sh",
        r#"[{"namespace":"ns","pod_name":"p","container_log":"c","row_count":1}] trailing"#,
    );

    let err = CommandCollector::new(path).collect().await.unwrap_err();
    assert!(matches!(err, CollectorError::Parse(_)));
}
