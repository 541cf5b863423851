//! Batch flow integration tests.
//!
//! Drives whole batches through the runner with scripted extractor
//! outcomes, then checks record state, progress events, and the
//! exported workbook.

mod common;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use common::{fields_named, FixtureDir, RecordingReporter, StubExtractor, StubOutcome};
use profex::batch::{BatchRunner, BatchState, SourceFile};
use profex::record::RecordStatus;
use profex::spreadsheet::{read_to_text, write_records};

fn runner(extractor: StubExtractor) -> BatchRunner {
    BatchRunner::new(Arc::new(extractor)).with_pacing_delay(Duration::ZERO)
}

fn state_for(paths: Vec<PathBuf>) -> BatchState {
    BatchState::from_files(paths.into_iter().map(SourceFile::new).collect())
}

/// One form that extracts cleanly, one that hits the API quota.
fn mixed_fixtures(dir: &FixtureDir) -> Vec<PathBuf> {
    let good = dir.write_workbook(
        "a.xlsx",
        &[
            vec!["姓名".to_string(), "张三".to_string()],
            vec!["学校".to_string(), "清华大学".to_string()],
        ],
    );
    let quota = dir.write_workbook(
        "b.xlsx",
        &[vec!["姓名".to_string(), "李四".to_string()]],
    );
    vec![good, quota]
}

fn mixed_extractor() -> StubExtractor {
    StubExtractor::new()
        .on("张三", StubOutcome::Fields(fields_named("张三", "清华大学")))
        .on("李四", StubOutcome::QuotaExceeded)
}

#[tokio::test]
async fn test_records_start_pending_in_selection_order() {
    let dir = FixtureDir::new();
    let state = state_for(mixed_fixtures(&dir));

    let names: Vec<_> = state.records().iter().map(|r| r.file_name.as_str()).collect();
    assert_eq!(names, vec!["a.xlsx", "b.xlsx"]);
    assert!(state
        .records()
        .iter()
        .all(|r| r.status == RecordStatus::Pending));

    let stats = state.stats();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.processed, 0);
}

#[tokio::test]
async fn test_batch_mixes_success_and_quota_failure() {
    let dir = FixtureDir::new();
    let state = state_for(mixed_fixtures(&dir));
    let reporter = RecordingReporter::new();

    let state = runner(mixed_extractor()).run(state, &reporter).await;

    let good = &state.records()[0];
    assert_eq!(good.status, RecordStatus::Success);
    // Exactly the extracted fields are present, everything else stays absent
    assert_eq!(good.fields, fields_named("张三", "清华大学"));
    assert!(good.error_message.is_none());

    let quota = &state.records()[1];
    assert_eq!(quota.status, RecordStatus::Error);
    assert!(quota.fields.is_empty());
    // The extractor's message lands in the record verbatim
    assert_eq!(
        quota.error_message.as_deref(),
        Some("API request failed (429 Too Many Requests): You exceeded your current quota")
    );

    let stats = state.stats();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.processed, 2);
    assert_eq!(stats.success, 1);
    assert_eq!(stats.failed, 1);
}

#[tokio::test]
async fn test_progress_events_track_each_transition() {
    let dir = FixtureDir::new();
    let state = state_for(mixed_fixtures(&dir));
    let reporter = RecordingReporter::new();

    runner(mixed_extractor()).run(state, &reporter).await;

    let events = reporter.events();
    assert_eq!(events.len(), 4);

    assert_eq!(events[0].index, 0);
    assert_eq!(events[0].status, RecordStatus::Processing);
    assert!(events[0].error.is_none());
    assert_eq!(events[0].stats.processed, 0);

    assert_eq!(events[1].index, 0);
    assert_eq!(events[1].status, RecordStatus::Success);
    assert_eq!(events[1].stats.processed, 1);
    assert_eq!(events[1].stats.success, 1);

    assert_eq!(events[2].index, 1);
    assert_eq!(events[2].status, RecordStatus::Processing);
    assert_eq!(events[2].stats.processed, 1);

    assert_eq!(events[3].index, 1);
    assert_eq!(events[3].status, RecordStatus::Error);
    assert!(events[3].error.as_deref().unwrap().contains("quota"));
    assert_eq!(events[3].stats.failed, 1);

    for event in &events {
        assert_eq!(event.stats.total, 2);
        assert_eq!(event.stats.processed, event.stats.success + event.stats.failed);
        assert!(event.stats.processed <= event.stats.total);
    }
}

#[tokio::test]
async fn test_corrupt_file_does_not_abort_batch() {
    let dir = FixtureDir::new();
    let corrupt = dir.write_raw("broken.xlsx", b"these bytes are not a workbook");
    let good = dir.write_workbook(
        "after.xlsx",
        &[vec!["姓名".to_string(), "张三".to_string()]],
    );

    let extractor =
        StubExtractor::new().on("张三", StubOutcome::Fields(fields_named("张三", "清华大学")));
    let state = runner(extractor)
        .run(state_for(vec![corrupt, good]), &RecordingReporter::new())
        .await;

    assert_eq!(state.records()[0].status, RecordStatus::Error);
    assert!(state.records()[0]
        .error_message
        .as_deref()
        .unwrap()
        .contains("Failed to parse workbook"));

    assert_eq!(state.records()[1].status, RecordStatus::Success);
    assert_eq!(state.stats().processed, 2);
}

#[tokio::test]
async fn test_empty_selection_emits_no_events() {
    let reporter = RecordingReporter::new();
    let state = runner(StubExtractor::new())
        .run(state_for(vec![]), &reporter)
        .await;

    assert!(state.records().is_empty());
    assert!(reporter.events().is_empty());
    assert_eq!(state.stats(), Default::default());
}

#[tokio::test]
async fn test_export_after_batch_has_header_and_row_per_record() {
    let dir = FixtureDir::new();
    let state = state_for(mixed_fixtures(&dir));
    let state = runner(mixed_extractor())
        .run(state, &RecordingReporter::new())
        .await;

    let bytes = write_records(state.records()).unwrap();
    let text = read_to_text(&bytes).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);

    assert!(lines[0].starts_with("文件名,学员姓名,性别"));
    assert!(lines[0].ends_with(",处理状态"));

    assert!(lines[1].starts_with("a.xlsx,张三,"));
    assert!(lines[1].contains("清华大学"));
    assert!(lines[1].ends_with(",成功"));

    assert!(lines[2].starts_with("b.xlsx,"));
    assert!(lines[2].ends_with(",失败"));

    for line in &lines {
        assert_eq!(line.split(',').count(), 32);
    }
}
