//! End-to-end tests for the peptax binary
//!
//! These tests run the real binary against a mock annotation service:
//! - Two-round LCA and lineage resolution
//! - Output table layout
//! - Failure handling per input file
//! - Preparation of peptide lists and genus summaries

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::path::Path;
use wiremock::{
    matchers::{body_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

const RANK_COUNT: usize = 27;
const GENUS: usize = 18;
const SPECIES: usize = 22;

/// Human lineage: superkingdom Eukaryota, genus Homo, species Homo sapiens
fn human_lineage() -> serde_json::Value {
    let mut lineage = vec![serde_json::Value::Null; RANK_COUNT];
    lineage[0] = json!(2759);
    lineage[GENUS] = json!(9605);
    lineage[SPECIES] = json!(9606);
    serde_json::Value::Array(lineage)
}

fn write_peptides(dir: &Path, name: &str, peptides: &str) {
    let input_dir = dir.join("peptides");
    std::fs::create_dir_all(&input_dir).unwrap();
    std::fs::write(input_dir.join(name), peptides).unwrap();
}

/// The binary with an empty environment, so no `PEPTAX_*` or `RUST_LOG`
/// setting of the host leaks into a test
fn peptax(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("peptax").unwrap();
    cmd.env_clear().current_dir(dir);
    if let Some(path) = std::env::var_os("PATH") {
        cmd.env("PATH", path);
    }
    cmd
}

fn annotate_cmd(dir: &Path, server: &MockServer) -> Command {
    let mut cmd = peptax(dir);
    cmd.arg("annotate")
        .arg("--base-url")
        .arg(server.uri())
        .arg("--input-dir")
        .arg(dir.join("peptides"))
        .arg("--output-dir")
        .arg(dir.join("lcas"));
    cmd
}

async fn mount_pept2data(server: &MockServer, peptides: serde_json::Value, response: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/mpa/pept2data"))
        .and(body_json(json!({ "peptides": peptides, "equate_il": true, "missed": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(server)
        .await;
}

async fn mount_taxa(server: &MockServer, taxids: serde_json::Value, response: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/private_api/taxa"))
        .and(body_json(json!({ "taxids": taxids })))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .expect(1)
        .mount(server)
        .await;
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect()
}

// ============================================================================
// Annotation
// ============================================================================

#[tokio::test]
async fn test_annotate_resolves_lca_and_lineage() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    write_peptides(dir.path(), "mixA-sage.0_01.txt", "AAAK\n\nBBBK\n");

    mount_pept2data(
        &server,
        json!(["AAAK", "BBBK"]),
        json!({ "peptides": [
            { "sequence": "AAAK", "lca": 9606 },
            { "sequence": "BBBK", "lca": null }
        ]}),
    )
    .await;
    mount_taxa(
        &server,
        json!([9606]),
        json!([{ "id": 9606, "name": "Homo sapiens", "lineage": human_lineage() }]),
    )
    .await;
    mount_taxa(
        &server,
        json!([2759, 9605]),
        json!([
            { "id": 2759, "name": "Eukaryota", "lineage": [] },
            { "id": 9605, "name": "Homo", "lineage": [] }
        ]),
    )
    .await;

    annotate_cmd(dir.path(), &server)
        .assert()
        .success()
        .stdout(predicate::str::contains("mixA-sage.0_01_taxonomy.tsv"));

    let rows = read_rows(&dir.path().join("lcas/mixA-sage.0_01_taxonomy.tsv"));
    assert_eq!(rows.len(), 2, "header plus one annotated peptide");
    assert_eq!(rows[0][..3], ["peptide", "lca", "superkingdom"]);
    assert_eq!(rows[0].len(), RANK_COUNT + 2);

    let row = &rows[1];
    assert_eq!(row.len(), RANK_COUNT + 2);
    assert_eq!(row[0], "AAAK");
    assert_eq!(row[1], "Homo sapiens");
    assert_eq!(row[2], "Eukaryota");
    assert_eq!(row[2 + GENUS], "Homo");
    assert_eq!(row[2 + SPECIES], "Homo sapiens");
    assert_eq!(row[3], "");
}

#[tokio::test]
async fn test_annotate_leaves_unknown_lineage_names_empty() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    write_peptides(dir.path(), "mix.txt", "AAAK\n");

    mount_pept2data(
        &server,
        json!(["AAAK"]),
        json!({ "peptides": [{ "sequence": "AAAK", "lca": 9606 }] }),
    )
    .await;
    mount_taxa(
        &server,
        json!([9606]),
        json!([{ "id": 9606, "name": "Homo sapiens", "lineage": human_lineage() }]),
    )
    .await;
    mount_taxa(
        &server,
        json!([2759, 9605]),
        json!([{ "id": 2759, "name": "Eukaryota", "lineage": [] }]),
    )
    .await;

    annotate_cmd(dir.path(), &server).assert().success();

    let rows = read_rows(&dir.path().join("lcas/mix_taxonomy.tsv"));
    assert_eq!(rows[1][2], "Eukaryota");
    assert_eq!(rows[1][2 + GENUS], "");
    assert_eq!(rows[1][2 + SPECIES], "Homo sapiens");
}

#[tokio::test]
async fn test_annotate_server_error_writes_no_table() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    write_peptides(dir.path(), "mix.txt", "AAAK\n");

    Mock::given(method("POST"))
        .and(path("/mpa/pept2data"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    annotate_cmd(dir.path(), &server)
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 1 input file(s) failed"));

    assert!(!dir.path().join("lcas/mix_taxonomy.tsv").exists());
}

#[tokio::test]
async fn test_annotate_missing_input_dir_sends_no_request() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    annotate_cmd(dir.path(), &server)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input not found"));

    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_annotate_empty_list_writes_header_only() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    write_peptides(dir.path(), "empty.txt", "\n\n");

    annotate_cmd(dir.path(), &server).assert().success();

    let rows = read_rows(&dir.path().join("lcas/empty_taxonomy.tsv"));
    assert_eq!(rows.len(), 1);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

// ============================================================================
// Preparation and summaries
// ============================================================================

#[test]
fn test_prepare_writes_threshold_lists() {
    let dir = tempfile::tempdir().unwrap();
    let rescored = dir.path().join("rescored");
    std::fs::create_dir(&rescored).unwrap();
    std::fs::write(
        rescored.join("mixA-sage.txt"),
        "peptide\tq-value\nK.AAAK.R\t0.0005\nR.CCC[+57.02]K.L\t0.02\n",
    )
    .unwrap();

    peptax(dir.path())
        .arg("prepare")
        .arg(&rescored)
        .arg("--output-dir")
        .arg(dir.path().join("peptides"))
        .arg("--thresholds")
        .arg("0.001,0.05")
        .assert()
        .success();

    let peptides = dir.path().join("peptides");
    assert_eq!(std::fs::read_to_string(peptides.join("mixA-sage.0_001.txt")).unwrap(), "AAAK\n");
    assert_eq!(
        std::fs::read_to_string(peptides.join("mixA-sage.0_05.txt")).unwrap(),
        "AAAK\nCCCK\n"
    );
}

#[test]
fn test_frequencies_summarizes_tables() {
    let dir = tempfile::tempdir().unwrap();
    let lcas = dir.path().join("lcas");
    std::fs::create_dir(&lcas).unwrap();
    std::fs::write(
        lcas.join("mixB-comet.0_05_taxonomy.tsv"),
        "peptide\tlca\tgenus\nAAAK\tx\tSalmonella\nCCCK\ty\tHomo\n",
    )
    .unwrap();
    let output = dir.path().join("frequencies.tsv");

    peptax(dir.path())
        .arg("frequencies")
        .arg("--input-dir")
        .arg(&lcas)
        .arg("--output")
        .arg(&output)
        .arg("--genera")
        .arg("Salmonella")
        .assert()
        .success();

    let rows = read_rows(&output);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1], ["mixB-comet.0_05", "mixB", "comet", "0_05", "Salmonella", "0.5"]);
    assert_eq!(rows[2], ["mixB-comet.0_05", "mixB", "comet", "0_05", "other", "0.5"]);
}

#[test]
fn test_config_show_prints_toml() {
    let dir = tempfile::tempdir().unwrap();
    peptax(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("base_url = \"https://api.unipept.ugent.be\""))
        .stdout(predicate::str::contains("peptide_batch_size = 10"))
        .stdout(predicate::str::contains("request_timeout_secs = 60"))
        .stdout(predicate::str::contains("max_retries = 0"));
}
