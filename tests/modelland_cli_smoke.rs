use predicates::prelude::*;
use std::fs;

fn data_dir_arg(tmp: &tempfile::TempDir) -> String {
    tmp.path().join("data").to_string_lossy().to_string()
}

#[test]
fn export_to_stdout_prints_seeded_backup() {
    let tmp = tempfile::tempdir().unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("modelland");
    cmd.args(["--data-dir", &data_dir_arg(&tmp), "export", "--stdout"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"properties\": ["))
        .stdout(predicate::str::contains("Hope Gardens Phase I"))
        .stdout(predicate::str::contains("\"timestamp\": \""));

    assert!(tmp.path().join("data/properties.json").exists());
    assert!(!tmp.path().join("data/messages.json").exists());
}

#[test]
fn import_then_export_round_trips_through_files() {
    let tmp = tempfile::tempdir().unwrap();
    let backup = tmp.path().join("backup.json");
    fs::write(
        &backup,
        serde_json::json!({
            "properties": [{
                "id": "p1",
                "title": "Imported Plot",
                "location": "Kisaju",
                "price": "KES 700,000"
            }],
            "settings": { "contactPhone": "+254 733 000 000" },
            "messages": []
        })
        .to_string(),
    )
    .unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("modelland");
    cmd.args([
        "--data-dir",
        &data_dir_arg(&tmp),
        "import",
        "--file",
        &backup.to_string_lossy(),
    ]);
    cmd.assert().success().stdout(predicate::str::contains(
        "{\"testimonials\":false,\"blog\":false,\"messages\":true}",
    ));

    let out = tmp.path().join("out.json");
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("modelland");
    cmd.args([
        "--data-dir",
        &data_dir_arg(&tmp),
        "export",
        "--out",
        &out.to_string_lossy(),
    ]);
    cmd.assert().success();

    let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
    assert_eq!(doc["properties"][0]["title"], "Imported Plot");
    assert_eq!(doc["settings"]["contactPhone"], "+254 733 000 000");
    assert_eq!(doc["testimonials"].as_array().unwrap().len(), 4);
}

#[test]
fn import_of_invalid_document_fails_without_writing() {
    let tmp = tempfile::tempdir().unwrap();
    let backup = tmp.path().join("bad.json");
    fs::write(&backup, "{\"properties\": []}").unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("modelland");
    cmd.args([
        "--data-dir",
        &data_dir_arg(&tmp),
        "import",
        "--file",
        &backup.to_string_lossy(),
    ]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid backup document"));

    assert!(!tmp.path().join("data/properties.json").exists());
}

#[test]
fn reset_removes_stored_files() {
    let tmp = tempfile::tempdir().unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("modelland");
    cmd.args(["--data-dir", &data_dir_arg(&tmp), "export", "--stdout"]);
    cmd.assert().success();
    assert!(tmp.path().join("data/settings.json").exists());

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("modelland");
    cmd.args(["--data-dir", &data_dir_arg(&tmp), "reset"]);
    cmd.assert().success();
    assert!(!tmp.path().join("data/settings.json").exists());
    assert!(!tmp.path().join("data/properties.json").exists());
}

#[test]
fn hash_admin_password_prints_argon2id_phc() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("modelland");
    cmd.env("MODELLAND_TEST_PASSWORD", "supersecret");
    cmd.args(["hash-admin-password", "--from-env", "MODELLAND_TEST_PASSWORD"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("$argon2id$"))
        .stdout(predicate::str::contains("supersecret").not());
}
