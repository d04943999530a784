//! Density search controller tests against synthetic pipeline logs.
//!
//! Time is paused, so settle and gate waits complete instantly.

mod common;

use std::fs;
use std::time::Duration;

use common::SyntheticOrchestrator;
use density_core::{DensityError, WorkerGroupLabel};
use density_orchestrator::PIPELINE_COUNT_KEY;
use density_samples::SampleStore;
use density_search::{DensityController, IncrementPolicy, SearchSettings};

fn controller(dir: &std::path::Path, policy: IncrementPolicy) -> DensityController {
    DensityController::new(
        SampleStore::new(dir, 20),
        SearchSettings {
            init_duration: Duration::from_secs(120),
            policy,
            gate_retries: 50,
        },
    )
}

#[tokio::test(start_paused = true)]
async fn converges_on_inverse_throughput() {
    let dir = tempfile::tempdir().unwrap();
    let label = WorkerGroupLabel::from("gst");
    let mut orch = SyntheticOrchestrator::new(dir.path(), "gst", |n| Some(100.0 / n as f64));

    let outcome = controller(dir.path(), IncrementPolicy::default())
        .search(&mut orch, 14.0, &label)
        .await
        .unwrap();

    assert_eq!(outcome.max_worker_count, 7);
    assert!(outcome.target_met);
    assert_eq!(outcome.label, label);
    assert_eq!(outcome.target_throughput, 14.0);
    assert_eq!(orch.starts, vec![1, 8, 7]);
    assert_eq!(orch.var(PIPELINE_COUNT_KEY), Some("7"));
}

#[tokio::test(start_paused = true)]
async fn fixed_increment_steps_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let label = WorkerGroupLabel::from("gst");
    let mut orch = SyntheticOrchestrator::new(dir.path(), "gst", |n| Some(100.0 / n as f64));

    let policy = IncrementPolicy {
        fixed: Some(3),
        guess: 5,
    };
    let outcome = controller(dir.path(), policy)
        .search(&mut orch, 14.0, &label)
        .await
        .unwrap();

    assert_eq!(outcome.max_worker_count, 7);
    assert!(outcome.target_met);
    assert_eq!(orch.starts, vec![1, 4, 7, 10, 9, 8, 7]);
}

#[tokio::test(start_paused = true)]
async fn exhausts_at_one_when_target_never_met() {
    let dir = tempfile::tempdir().unwrap();
    let label = WorkerGroupLabel::from("gst");
    let mut orch = SyntheticOrchestrator::new(dir.path(), "gst", |_| Some(5.0));

    let outcome = controller(dir.path(), IncrementPolicy::default())
        .search(&mut orch, 14.0, &label)
        .await
        .unwrap();

    assert_eq!(outcome.max_worker_count, 1);
    assert!(!outcome.target_met);
    assert_eq!(orch.starts, vec![1]);
}

#[tokio::test(start_paused = true)]
async fn missing_logs_fall_back_to_previous_count() {
    let dir = tempfile::tempdir().unwrap();
    let label = WorkerGroupLabel::from("gst");
    // Workers stop logging beyond 3 pipelines.
    let mut orch = SyntheticOrchestrator::new(dir.path(), "gst", |n| {
        (n <= 3).then(|| 30.0 / n as f64)
    });

    let outcome = controller(dir.path(), IncrementPolicy::default())
        .search(&mut orch, 10.0, &label)
        .await
        .unwrap();

    // 1 worker at 30 fps → increment 3 → 4 workers never log → back to 1.
    assert_eq!(orch.starts, vec![1, 4]);
    assert_eq!(outcome.max_worker_count, 1);
    assert!(!outcome.target_met);
}

#[tokio::test(start_paused = true)]
async fn missing_logs_on_first_iteration_floor_at_one() {
    let dir = tempfile::tempdir().unwrap();
    let label = WorkerGroupLabel::from("gst");
    let mut orch = SyntheticOrchestrator::new(dir.path(), "gst", |_| None);

    let started = tokio::time::Instant::now();
    let outcome = controller(dir.path(), IncrementPolicy::default())
        .search(&mut orch, 14.0, &label)
        .await
        .unwrap();

    assert_eq!(outcome.max_worker_count, 1);
    assert!(!outcome.target_met);
    // Settle wait plus 49 one-second gaps between 50 gate attempts.
    assert!(started.elapsed() >= Duration::from_secs(120 + 49));
}

#[tokio::test(start_paused = true)]
async fn stale_logs_are_removed_before_search() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("pipeline999_gst.log"), "1000.0\n").unwrap();
    fs::write(dir.path().join("pipeline998_other.log"), "1000.0\n").unwrap();

    let label = WorkerGroupLabel::from("gst");
    let mut orch = SyntheticOrchestrator::new(dir.path(), "gst", |_| Some(5.0));

    let outcome = controller(dir.path(), IncrementPolicy::default())
        .search(&mut orch, 14.0, &label)
        .await
        .unwrap();

    // The stale 1000 fps log would otherwise have counted.
    assert!(!outcome.target_met);
    assert!(!dir.path().join("pipeline999_gst.log").exists());
    assert!(!dir.path().join("pipeline998_other.log").exists());
}

#[tokio::test(start_paused = true)]
async fn orchestrator_failure_propagates() {
    let dir = tempfile::tempdir().unwrap();
    let label = WorkerGroupLabel::from("gst");
    let mut orch =
        SyntheticOrchestrator::new(dir.path(), "gst", |_| Some(50.0)).failing_for("gst");

    let err = controller(dir.path(), IncrementPolicy::default())
        .search(&mut orch, 14.0, &label)
        .await
        .unwrap_err();

    assert!(matches!(err, DensityError::Orchestrator(_)));
    assert_eq!(orch.starts, vec![1]);
}

#[tokio::test(start_paused = true)]
async fn rejects_non_positive_target_before_starting() {
    let dir = tempfile::tempdir().unwrap();
    let label = WorkerGroupLabel::from("gst");
    let mut orch = SyntheticOrchestrator::new(dir.path(), "gst", |_| Some(50.0));

    let err = controller(dir.path(), IncrementPolicy::default())
        .search(&mut orch, 0.0, &label)
        .await
        .unwrap_err();

    assert!(matches!(err, DensityError::Argument(_)));
    assert!(orch.starts.is_empty());
}

#[tokio::test(start_paused = true)]
async fn rejects_zero_increments_before_starting() {
    let dir = tempfile::tempdir().unwrap();
    let label = WorkerGroupLabel::from("gst");

    for policy in [
        IncrementPolicy {
            fixed: Some(0),
            guess: 5,
        },
        IncrementPolicy {
            fixed: None,
            guess: 0,
        },
    ] {
        let mut orch = SyntheticOrchestrator::new(dir.path(), "gst", |n| Some(100.0 / n as f64));
        let err = tokio::time::timeout(
            Duration::from_secs(10_000),
            controller(dir.path(), policy).search(&mut orch, 14.0, &label),
        )
        .await
        .expect("search returned")
        .unwrap_err();

        assert!(matches!(err, DensityError::Argument(_)), "{policy:?}: {err}");
        assert!(err.to_string().contains("greater than 0"));
        assert!(orch.starts.is_empty());
    }
}
