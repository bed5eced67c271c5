use std::path::{Path, PathBuf};

use salsa_results::{plot_results, PlotOptions, ResultsError, StateLog};

const RESULT_FILES: [&str; 6] = [
    "State.csv",
    "position.png",
    "velocity.png",
    "attitude.png",
    "clock_bias.png",
    "trajectory.png",
];

/// A slow circle at constant height, with a drifting clock.
fn write_state_log(path: &Path, records: usize) {
    let mut bytes = Vec::new();
    for i in 0..records {
        let t = i as f64 * 0.1;
        let half_yaw = t / 4.0;
        let row = [
            t,
            t.cos(),
            t.sin(),
            -1.5,
            half_yaw.cos(),
            0.0,
            0.0,
            half_yaw.sin(),
            -t.sin(),
            t.cos(),
            0.0,
            1e-6 * t,
            1e-6,
        ];
        bytes.extend(row.iter().flat_map(|value| value.to_le_bytes()));
    }
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, bytes).unwrap();
}

fn small_images() -> PlotOptions {
    PlotOptions {
        size: (640, 480),
        ..PlotOptions::default()
    }
}

fn assert_result_files(files: &[PathBuf], plot_dir: &Path) {
    let expected: Vec<PathBuf> = RESULT_FILES.iter().map(|name| plot_dir.join(name)).collect();
    assert_eq!(files, expected.as_slice());
    for file in files {
        assert!(file.is_file(), "{} was not written", file.display());
    }
}

#[test]
fn test_missing_state_log() {
    let dir = tempfile::tempdir().unwrap();

    let result = plot_results(dir.path(), "Est/", &PlotOptions::default());

    match result {
        Err(ResultsError::MissingLog(path)) => {
            assert_eq!(path, dir.path().join("Est").join("State.log"))
        }
        other => panic!("expected a missing log error, got {:?}", other),
    }
    // nothing is created when there is nothing to plot
    assert!(!dir.path().join("plots").exists());
}

#[test]
fn test_read_state_log_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("State.log");

    let mut bytes = Vec::new();
    for i in 0..10 {
        let t = i as f64 * 0.01;
        let row = [t, t, 2.0 * t, -t, 1.0, 0.0, 0.0, 0.0, 1.0, 2.0, -1.0, 0.0, 0.0];
        bytes.extend(row.iter().flat_map(|value| value.to_le_bytes()));
    }
    std::fs::write(&path, bytes).unwrap();

    let log = StateLog::read(&path).unwrap();
    assert_eq!(log.len(), 10);
    assert_eq!(log.records()[9].p.y, 2.0 * 0.09);
    assert_eq!(log.records()[3].v.z, -1.0);
}

#[test]
fn test_plot_results_writes_every_file() {
    let dir = tempfile::tempdir().unwrap();
    write_state_log(&dir.path().join("Est").join("State.log"), 50);

    let files = plot_results(dir.path(), "Est/", &small_images()).unwrap();

    assert_result_files(&files, &dir.path().join("plots"));
    let csv = std::fs::read_to_string(&files[0]).unwrap();
    // header plus one line per state
    assert_eq!(csv.lines().count(), 51);
    for png in &files[1..] {
        let header = std::fs::read(png).unwrap();
        assert_eq!(&header[..4], b"\x89PNG");
    }
}

#[test]
fn test_plot_truth_without_truth_log() {
    let dir = tempfile::tempdir().unwrap();
    write_state_log(&dir.path().join("Est").join("State.log"), 20);
    let options = PlotOptions {
        plot_truth: true,
        ..small_images()
    };

    let files = plot_results(dir.path(), "Est/", &options).unwrap();

    assert!(!dir.path().join("Truth.log").exists());
    assert_result_files(&files, &dir.path().join("plots"));
}

#[test]
fn test_plot_truth_overlay() {
    let dir = tempfile::tempdir().unwrap();
    write_state_log(&dir.path().join("Est").join("State.log"), 20);
    write_state_log(&dir.path().join("Truth.log"), 40);
    let options = PlotOptions {
        plot_truth: true,
        output_dir: dir.path().join("figures"),
        ..small_images()
    };

    let files = plot_results(dir.path(), "Est/", &options).unwrap();

    assert_result_files(&files, &dir.path().join("figures"));
    assert!(!dir.path().join("plots").exists());
}

#[test]
fn test_plot_empty_state_log() {
    let dir = tempfile::tempdir().unwrap();
    write_state_log(&dir.path().join("Est").join("State.log"), 0);

    let files = plot_results(dir.path(), "Est/", &small_images()).unwrap();

    assert_result_files(&files, &dir.path().join("plots"));
}
