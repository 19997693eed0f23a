use assert_cmd::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(name: &str) -> PathBuf {
    let path = repo_root().join("fixtures").join("graphs").join(name);
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

fn run_json(args: &[&str]) -> Value {
    let exe = assert_cmd::cargo_bin!("linkscape");
    let output = Command::new(exe)
        .current_dir(repo_root())
        .args(args)
        .output()
        .expect("spawn linkscape");
    assert!(
        output.status.success(),
        "linkscape {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn metrics_of_largest_component() {
    let path = fixture("concepts.json");
    let out = run_json(&[
        "metrics",
        "--select",
        "largest",
        path.to_string_lossy().as_ref(),
    ]);
    assert_eq!(out["nodes"], 10);
    assert_eq!(out["weak_components"], 1);
    assert_eq!(out["directed"], true);
}

#[test]
fn centrality_top_n_truncates_ranking() {
    let path = fixture("bridged-triangles.json");
    let out = run_json(&[
        "centrality",
        "--kind",
        "betweenness",
        "--top",
        "2",
        path.to_string_lossy().as_ref(),
    ]);
    assert_eq!(out["kind"], "betweenness");
    let scores = out["scores"].as_array().expect("scores");
    assert_eq!(scores.len(), 2);
    // The bridge endpoints carry every cross-triangle shortest path.
    assert_eq!(scores[0][0], "c");
    assert_eq!(scores[1][0], "d");
}

#[test]
fn communities_split_bridged_triangles() {
    let path = fixture("bridged-triangles.json");
    let out = run_json(&["communities", "--seed", "3", path.to_string_lossy().as_ref()]);
    let communities = out["communities"].as_array().expect("communities");
    let total: usize = communities
        .iter()
        .map(|c| c.as_array().map_or(0, Vec::len))
        .sum();
    assert_eq!(total, 6);
}

#[test]
fn layout_reads_stdin_and_applies_params() {
    let path = fixture("concepts.json");
    let exe = assert_cmd::cargo_bin!("linkscape");
    let output = Command::new(exe)
        .current_dir(repo_root())
        .args([
            "layout",
            "--solver",
            "repulsion",
            "--param",
            "springLength=120",
            "--max-iterations",
            "50",
            "-",
        ])
        .stdin(fs::File::open(&path).expect("open fixture"))
        .output()
        .expect("spawn linkscape");
    assert!(output.status.success());

    let out: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(out["physics"]["solver"], "repulsion");
    assert_eq!(out["physics"]["params"]["spring_length"], 120.0);
    assert!(out["iterations"].as_u64().is_some_and(|i| i <= 50));
    assert_eq!(out["nodes"].as_object().map(|m| m.len()), Some(12));
}

#[test]
fn summary_uses_config_file_with_flag_overrides() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = tmp.path().join("session.yaml");
    fs::write(
        &config,
        "selection:\n  kind: largest_component\nphysics:\n  solver: barnes_hut\n  params: {}\nsimulation:\n  max_iterations: 100\n",
    )
    .expect("write config");

    let path = fixture("concepts.json");
    let out = run_json(&[
        "summary",
        "--config",
        config.to_string_lossy().as_ref(),
        "--kind",
        "closeness",
        "--top",
        "3",
        path.to_string_lossy().as_ref(),
    ]);
    assert_eq!(out["subgraph"]["nodes"], 10);
    assert_eq!(out["centrality"]["kind"], "closeness");
    assert_eq!(out["centrality"]["scores"].as_array().map(Vec::len), Some(3));
    assert_eq!(out["layout"]["physics"]["solver"], "barnes_hut");
    assert!(out["metrics"].is_object());
    assert!(out["communities"].is_object());
}

#[test]
fn select_reports_missing_seed() {
    let path = fixture("concepts.json");
    let out = run_json(&[
        "select",
        "--select",
        "neighborhood:cobol",
        path.to_string_lossy().as_ref(),
    ]);
    assert_eq!(out["advisory"]["kind"], "seed_not_found");
    assert_eq!(out["graph"]["nodes"].as_array().map(Vec::len), Some(0));
}

#[test]
fn usage_errors_exit_with_2() {
    let exe = assert_cmd::cargo_bin!("linkscape");
    Command::new(exe)
        .args(["layout", "--solver", "spring-electrical"])
        .assert()
        .code(2);
}

#[test]
fn malformed_graph_exits_with_1() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("broken.json");
    fs::write(&path, r#"{"nodes":[{"id":"a"}],"links":[{"source":"a","target":"zz"}]}"#)
        .expect("write graph");

    let exe = assert_cmd::cargo_bin!("linkscape");
    Command::new(exe)
        .args(["metrics", path.to_string_lossy().as_ref()])
        .assert()
        .code(1);
}
