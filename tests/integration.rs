//! End-to-end integration tests.

use std::fs;
use std::path::Path;

use ews_bench::{
    EwsBench, EwsError, HarnessError, Operation, OperationError, TimingMode, OPERATION_NAMES,
};

fn read_column(path: &Path) -> Vec<f64> {
    fs::read_to_string(path)
        .expect("file should exist")
        .lines()
        .map(|line| line.parse::<f64>().expect("numeric line"))
        .collect()
}

/// The reference configuration end to end.
#[test]
fn reference_run_aggregate() {
    let dir = tempfile::tempdir().unwrap();
    let report = EwsBench::new().output_dir(dir.path()).run().expect("run should succeed");

    assert_eq!(report.transition, Some(860));
    assert_eq!(report.result.repeats, 100);

    let residuals = read_column(&dir.path().join("ricker.csv"));
    assert_eq!(residuals.len(), 1000);
    assert!(residuals[..=860].iter().all(|r| r.is_finite()));
    assert!(residuals[861..].iter().all(|r| r.is_nan()));

    let timings = read_column(&dir.path().join("t_elapsed.csv"));
    assert_eq!(timings.len(), 8);
    assert!(timings.iter().all(|t| *t >= 0.0 && t.is_finite()));
    assert_eq!(timings, report.result.seconds());
}

#[test]
fn minimum_mode_writes_minruntime_file() {
    let dir = tempfile::tempdir().unwrap();
    let report = EwsBench::quick()
        .mode(TimingMode::Minimum)
        .output_dir(dir.path())
        .run()
        .unwrap();

    assert!(!dir.path().join("t_elapsed.csv").exists());
    let timings = read_column(&dir.path().join("t_minruntime.csv"));
    assert_eq!(timings.len(), 8);

    for (timing, name) in report.result.timings.iter().zip(OPERATION_NAMES) {
        assert_eq!(timing.name, name);
        assert_eq!(timing.samples.len(), 5);
        let min = timing.samples.iter().copied().fold(f64::INFINITY, f64::min);
        assert_eq!(timing.seconds, min);
        assert!(timing.samples.iter().all(|s| *s >= timing.seconds));
    }
}

#[test]
fn residual_file_is_reproducible() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    EwsBench::quick().repeats(1).output_dir(a.path()).run().unwrap();
    EwsBench::quick().repeats(1).output_dir(b.path()).run().unwrap();

    let first = fs::read(a.path().join("ricker.csv")).unwrap();
    let second = fs::read(b.path().join("ricker.csv")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn different_seed_changes_residuals() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    EwsBench::quick().repeats(1).output_dir(a.path()).run().unwrap();
    EwsBench::quick().repeats(1).seed(1).output_dir(b.path()).run().unwrap();

    assert_ne!(
        fs::read(a.path().join("ricker.csv")).unwrap(),
        fs::read(b.path().join("ricker.csv")).unwrap()
    );
}

#[test]
fn computed_transition_is_used_when_not_overridden() {
    let dir = tempfile::tempdir().unwrap();
    let report = EwsBench::quick()
        .repeats(1)
        .transition(None)
        .output_dir(dir.path())
        .run()
        .unwrap();

    let computed = report.computed_transition.expect("ramp crosses the fold");
    assert_eq!(report.transition, Some(computed));
    assert!((2.3..2.4).contains(&report.critical_f));

    let residuals = read_column(&report.residuals_path);
    assert_eq!(residuals.len(), 1000);
    assert_eq!(residuals.iter().filter(|r| r.is_finite()).count(), computed + 1);
}

/// A failing operation at each position aborts with that index and writes nothing.
#[test]
fn failing_operation_aborts_without_output() {
    for k in 0..OPERATION_NAMES.len() {
        let dir = tempfile::tempdir().unwrap();
        let stub = Operation::new("stub", |_| Err::<(), OperationError>("injected failure".into()));

        let err = EwsBench::quick()
            .repeats(2)
            .output_dir(dir.path())
            .replace_operation(k, stub)
            .run()
            .unwrap_err();

        match err {
            EwsError::Harness(HarnessError::OperationFailed { index, name, trial, .. }) => {
                assert_eq!(index, k);
                assert_eq!(name, "stub");
                assert_eq!(trial, Some(0));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0, "files left for k={k}");
    }
}

#[test]
fn late_trial_failure_reports_trial() {
    let dir = tempfile::tempdir().unwrap();
    let mut calls = 0;
    let stub = Operation::new("flaky", move |_| {
        calls += 1;
        if calls == 3 {
            Err::<(), OperationError>("third call fails".into())
        } else {
            Ok(())
        }
    });

    let err = EwsBench::quick()
        .output_dir(dir.path())
        .replace_operation(6, stub)
        .run()
        .unwrap_err();
    assert!(matches!(
        err,
        EwsError::Harness(HarnessError::OperationFailed { index: 6, trial: Some(2), .. })
    ));
    assert!(err.to_string().contains("trial 2"));
    assert!(!dir.path().join("ricker.csv").exists());
}

#[test]
fn missing_output_directory_is_an_output_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = EwsBench::quick()
        .repeats(1)
        .output_dir(dir.path().join("does-not-exist"))
        .run()
        .unwrap_err();
    assert!(matches!(err, EwsError::Output(_)), "{err}");
}

/// A later file failing to write must not leave the earlier ones behind.
#[test]
fn failed_write_leaves_no_partial_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ews_bench::Config::default();
    config.harness.repeats = 1;
    config.output.dir = dir.path().to_path_buf();
    config.output.timings = Some("missing/t_elapsed.csv".into());

    let err = EwsBench::with_config(config).run().unwrap_err();
    assert!(matches!(err, EwsError::Output(_)), "{err}");
    let left: Vec<_> = fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
    assert!(left.is_empty(), "files left behind: {left:?}");

    let mut config = ews_bench::Config::default();
    config.harness.repeats = 1;
    config.output.dir = dir.path().to_path_buf();
    config.output.json = Some("missing/report.json".into());

    let err = EwsBench::with_config(config).run().unwrap_err();
    assert!(matches!(err, EwsError::Output(_)), "{err}");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn invalid_configuration_fails_before_running() {
    let dir = tempfile::tempdir().unwrap();
    let err = EwsBench::new().repeats(0).output_dir(dir.path()).run().unwrap_err();
    assert!(matches!(err, EwsError::Config(_)));

    let err = EwsBench::new().tmax(0).output_dir(dir.path()).run().unwrap_err();
    assert!(matches!(err, EwsError::Generation(_)));

    let err = EwsBench::new().forcing(vec![]).output_dir(dir.path()).run().unwrap_err();
    assert!(matches!(err, EwsError::Generation(_)));

    let err = EwsBench::new().transition(Some(5000)).output_dir(dir.path()).run().unwrap_err();
    assert!(matches!(err, EwsError::Preprocessing(_)));

    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn json_report_and_kendall_trends() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ews_bench::Config::default();
    config.harness.repeats = 2;
    config.output.dir = dir.path().to_path_buf();
    config.output.json = Some("report.json".into());

    let report = EwsBench::with_config(config).run().unwrap();
    let text = fs::read_to_string(dir.path().join("report.json")).unwrap();
    let back: ews_bench::BenchmarkResult = serde_json::from_str(&text).unwrap();
    assert_eq!(back.timings.len(), 8);

    assert_eq!(report.trends.len(), 6);
    // Variance rises towards the fold.
    let variance = report.trends.iter().find(|t| t.indicator == "variance").unwrap();
    assert!(variance.tau > 0.0, "variance tau = {}", variance.tau);
}
