use assert_cmd::cargo::cargo_bin_cmd;
use serde::Deserialize;
use std::{error::Error, path::Path, path::PathBuf};
use tempfile::tempdir;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetricsOutput {
    heart_rate: f64,
    heart_rate_variability: f64,
    qt_interval: f64,
    r_peaks: Vec<i64>,
}

fn simulate(out: &Path, bpm: &str, duration_s: &str, seed: &str) {
    cargo_bin_cmd!("cardio")
        .args([
            "simulate",
            "--out",
            out.to_str().expect("utf8 path"),
            "--bpm",
            bpm,
            "--jitter-bpm",
            "0",
            "--duration-s",
            duration_s,
            "--noise-mv",
            "0.02",
            "--artifact-probability",
            "0",
            "--wander-mv",
            "0",
            "--seed",
            seed,
        ])
        .assert()
        .success();
}

#[test]
fn analyze_synthetic_window() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let stream = dir.path().join("stream.csv");
    simulate(&stream, "63", "2", "7");

    let mut cmd = cargo_bin_cmd!("cardio");
    cmd.args(["analyze", "--input", stream.to_str().expect("utf8 path")]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let metrics: MetricsOutput = serde_json::from_slice(&out)?;

    assert!((2..=3).contains(&metrics.r_peaks.len()));
    assert!(
        (metrics.heart_rate - 63.0).abs() <= 10.0,
        "heart rate {}",
        metrics.heart_rate
    );
    assert_eq!(metrics.heart_rate_variability, 0.0);
    assert!(metrics.qt_interval >= 0.0);
    Ok(())
}

#[test]
fn analyze_short_stream_reports_defaults() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("cardio");
    cmd.args(["analyze", "--input", &sample_path("test_data/short_stream.csv")]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let metrics: MetricsOutput = serde_json::from_slice(&out)?;
    assert_eq!(metrics.heart_rate, 0.0);
    assert!(metrics.r_peaks.is_empty());
    Ok(())
}

#[test]
fn config_window_size_applies() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let stream = dir.path().join("stream.csv");
    simulate(&stream, "63", "2", "7");
    let config = dir.path().join("cardio.toml");
    std::fs::write(&config, "window_size = 520\n")?;

    let mut cmd = cargo_bin_cmd!("cardio");
    cmd.args([
        "analyze",
        "--config",
        config.to_str().expect("utf8 path"),
        "--input",
        stream.to_str().expect("utf8 path"),
    ]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let metrics: MetricsOutput = serde_json::from_slice(&out)?;
    assert_eq!(metrics.heart_rate, 0.0);
    Ok(())
}

#[test]
fn replay_publishes_once_per_ready_batch() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let stream = dir.path().join("stream.csv");
    // 650 samples -> 9 batches of 73, windows ready from the 4th on
    simulate(&stream, "60", "5", "11");

    let mut cmd = cargo_bin_cmd!("cardio");
    cmd.args([
        "replay",
        "--input",
        stream.to_str().expect("utf8 path"),
        "--batch-size",
        "73",
    ]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(out)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 6);
    for line in lines {
        let metrics: MetricsOutput = serde_json::from_str(line)?;
        assert!(metrics.heart_rate > 0.0);
    }
    Ok(())
}

fn sample_path(relative: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .join(relative)
        .to_string_lossy()
        .to_string()
}
