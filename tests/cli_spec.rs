//! `astro-bridge render` end to end, reading chart JSON from temp files.

use std::path::Path;
use std::process::Command;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};

fn write_chart(dir: &Path, file: &str, name: &str, planets: Value) -> std::path::PathBuf {
    let path = dir.join(file);
    let chart = json!({
        "name": name,
        "year": 2025,
        "month": 6,
        "day": 2,
        "hour": 12,
        "minute": 0,
        "latitude": -3.7172,
        "longitude": -38.5247,
        "planets": planets
    });
    std::fs::write(&path, chart.to_string()).expect("Failed to write chart");
    path
}

fn charts(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let natal = write_chart(
        dir,
        "natal.json",
        "Ana",
        json!([{ "planet": "moon", "longitude": 10.0, "sign": "aries" }]),
    );
    let transit = write_chart(
        dir,
        "transit.json",
        "Now",
        json!([{ "planet": "venus", "longitude": 13.0, "sign": "aries" }]),
    );
    (natal, transit)
}

fn astro_bridge() -> Command {
    Command::new(env!("CARGO_BIN_EXE_astro-bridge"))
}

#[test]
fn render_writes_svg_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let (natal, transit) = charts(dir.path());

    let output = astro_bridge()
        .arg("render")
        .arg("--natal")
        .arg(&natal)
        .arg("--transit")
        .arg(&transit)
        .output()
        .expect("Failed to run astro-bridge");

    assert!(output.status.success());
    let svg = String::from_utf8(output.stdout).unwrap();
    assert!(svg.starts_with("<?xml"));
    assert!(svg.contains(r##"stroke="#FF0000" stroke-width="2""##));
}

#[test]
fn render_writes_base64_json_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let (natal, transit) = charts(dir.path());
    let out = dir.path().join("chart.json");

    let status = astro_bridge()
        .args(["render", "--base64", "--theme", "dark", "--output"])
        .arg(&out)
        .arg("--natal")
        .arg(&natal)
        .arg("--transit")
        .arg(&transit)
        .status()
        .expect("Failed to run astro-bridge");

    assert!(status.success());
    let encoded: Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let svg = STANDARD
        .decode(encoded["svg_base64"].as_str().unwrap())
        .unwrap();
    assert!(String::from_utf8(svg).unwrap().contains("Ana - Natal Chart with Transits of Now"));
}

#[test]
fn render_rejects_unknown_theme() {
    let dir = tempfile::tempdir().unwrap();
    let (natal, transit) = charts(dir.path());

    let output = astro_bridge()
        .args(["render", "--theme", "neon", "--natal"])
        .arg(&natal)
        .arg("--transit")
        .arg(&transit)
        .output()
        .expect("Failed to run astro-bridge");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown theme"));
}

#[test]
fn render_rejects_chart_without_planets() {
    let dir = tempfile::tempdir().unwrap();
    let natal = write_chart(dir.path(), "empty.json", "Empty", json!([]));
    let (_, transit) = charts(dir.path());

    let output = astro_bridge()
        .args(["render", "--natal"])
        .arg(&natal)
        .arg("--transit")
        .arg(&transit)
        .output()
        .expect("Failed to run astro-bridge");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
