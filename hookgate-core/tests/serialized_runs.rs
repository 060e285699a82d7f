//! Concurrency tests for the execution gate.
//!
//! Every test runs a real shell script that appends timestamped start and
//! end markers to a shared log. Completion is observed through the run
//! report channel, never by sleeping.

use hookgate_core::config::{SharedConfig, UpdateConfig, WebhookConfig};
use hookgate_core::dispatcher::{Dispatch, TriggerDispatcher};
use hookgate_core::gate::{GateState, RunReport, UpdateCoordinator};
use hookgate_core::runner::UpdateCommand;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::broadcast;

fn marker_script(log: &Path) -> String {
    format!(
        r#"#!/bin/bash
set -e
echo "start $HOOKGATE_RUN_ID $(date +%s%N)" >> "{log}"
sleep 0.1
echo "end $HOOKGATE_RUN_ID $(date +%s%N)" >> "{log}"
"#,
        log = log.display()
    )
}

struct Fixture {
    _dir: tempfile::TempDir,
    script: PathBuf,
    log: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("update.sh");
    let log = dir.path().join("markers.log");
    std::fs::write(&script, marker_script(&log)).unwrap();
    Fixture {
        _dir: dir,
        script,
        log,
    }
}

fn marker_command(fixture: &Fixture) -> UpdateCommand {
    UpdateCommand::script(&fixture.script, Some(Path::new("/bin/bash")))
}

async fn collect_reports(rx: &mut broadcast::Receiver<RunReport>, n: usize) -> Vec<RunReport> {
    let mut reports = Vec::with_capacity(n);
    for _ in 0..n {
        let report = tokio::time::timeout(Duration::from_secs(30), rx.recv())
            .await
            .expect("timed out waiting for run report")
            .expect("report channel closed");
        reports.push(report);
    }
    reports
}

#[derive(Debug)]
struct Interval {
    run_id: String,
    start: u128,
    end: u128,
}

/// Parse the marker log into one interval per run, asserting that markers
/// strictly alternate start/end for the same run.
fn parse_intervals(log: &Path) -> Vec<Interval> {
    let content = std::fs::read_to_string(log).unwrap();
    let lines: Vec<(&str, &str, u128)> = content
        .lines()
        .map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            assert_eq!(parts.len(), 3, "bad marker line {line:?}");
            (parts[0], parts[1], parts[2].parse().unwrap())
        })
        .collect();

    assert_eq!(lines.len() % 2, 0, "unbalanced markers:\n{content}");
    lines
        .chunks(2)
        .map(|pair| {
            let (kind_a, id_a, start) = pair[0];
            let (kind_b, id_b, end) = pair[1];
            assert_eq!(kind_a, "start", "interleaved markers:\n{content}");
            assert_eq!(kind_b, "end", "interleaved markers:\n{content}");
            assert_eq!(id_a, id_b, "interleaved runs:\n{content}");
            Interval {
                run_id: id_a.to_string(),
                start,
                end,
            }
        })
        .collect()
}

fn assert_no_overlap(intervals: &[Interval]) {
    for window in intervals.windows(2) {
        assert!(
            window[0].end <= window[1].start,
            "runs overlap: {:?} and {:?}",
            window[0],
            window[1]
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_triggers_run_one_at_a_time() {
    const N: usize = 5;
    let fixture = fixture();
    let coordinator = UpdateCoordinator::default();
    let mut rx = coordinator.subscribe();

    for _ in 0..N {
        coordinator.spawn_update(marker_command(&fixture));
    }

    let reports = collect_reports(&mut rx, N).await;
    assert!(reports.iter().all(|r| r.outcome.is_success()));

    let intervals = parse_intervals(&fixture.log);
    assert_eq!(intervals.len(), N, "each trigger must produce exactly one run");
    assert_no_overlap(&intervals);

    let mut ids: Vec<String> = intervals.iter().map(|i| i.run_id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), N);

    assert_eq!(coordinator.state(), GateState::Idle);
    assert_eq!(coordinator.pending(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn reports_never_overlap_in_time() {
    const N: usize = 3;
    let fixture = fixture();
    let coordinator = UpdateCoordinator::default();
    let mut rx = coordinator.subscribe();

    let runs: Vec<_> = (0..N)
        .map(|_| {
            let coordinator = coordinator.clone();
            let command = marker_command(&fixture);
            tokio::spawn(async move { coordinator.run_update(command).await })
        })
        .collect();
    for run in runs {
        run.await.unwrap();
    }

    let mut reports = collect_reports(&mut rx, N).await;
    reports.sort_by_key(|r| r.started_at);
    for window in reports.windows(2) {
        assert!(window[0].finished_at <= window[1].started_at);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failed_run_does_not_block_the_next_one() {
    let fixture = fixture();
    let coordinator = UpdateCoordinator::default();
    let mut rx = coordinator.subscribe();

    coordinator.spawn_update(UpdateCommand::new("/nonexistent/hookgate-update"));
    coordinator.spawn_update(marker_command(&fixture));

    let reports = collect_reports(&mut rx, 2).await;
    assert_eq!(reports.iter().filter(|r| r.outcome.is_success()).count(), 1);
    assert_eq!(parse_intervals(&fixture.log).len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn dispatched_pushes_are_serialized() {
    const N: usize = 4;
    let fixture = fixture();
    let config = SharedConfig::new(
        WebhookConfig::new(b"secret".to_vec(), "main"),
        UpdateConfig::new(&fixture.script, Some(PathBuf::from("/bin/bash"))),
    );
    let dispatcher = TriggerDispatcher::new(config, UpdateCoordinator::default());
    let mut rx = dispatcher.coordinator().subscribe();

    let body = br#"{"ref":"refs/heads/main"}"#;
    let handles: Vec<_> = (0..N)
        .map(|_| {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move { dispatcher.dispatch(body).await.unwrap() })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap(), Dispatch::Queued);
    }

    let reports = collect_reports(&mut rx, N).await;
    assert!(reports.iter().all(|r| r.outcome.is_success()));

    let intervals = parse_intervals(&fixture.log);
    assert_eq!(intervals.len(), N);
    assert_no_overlap(&intervals);
}
