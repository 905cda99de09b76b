use std::fs;
use std::path::Path;
use std::process::Command;

fn ksh(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_ksh"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run ksh")
}

fn write_campaign(dir: &Path) -> String {
    let path = dir.join("campaign.yaml");
    fs::write(
        &path,
        format!(
            r#"
workdir: {}
runs:
  even:
    nuclide: O18
    interaction: usdb.snt
    states: "0+2,2+1"
    zero_body: -1.0
  odd:
    nuclide: F19
    interaction: usdb.snt
    states: "0.5+1"
"#,
            dir.display()
        ),
    )
    .expect("write campaign");
    path.display().to_string()
}

#[test]
fn names_prints_derived_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_campaign(dir.path());
    let output = ksh(&["names", "--config", &config, "--run", "even"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["summary"], "summary_O18_usdb.txt");
    assert_eq!(json["mixed_parity"], false);
    assert_eq!(json["states"]["2+1"]["wavefunction"], "O18_usdb_j4p.wav");
}

#[test]
fn levels_reads_the_summary() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_campaign(dir.path());
    fs::write(
        dir.path().join("summary_O18_usdb.txt"),
        "   1   0 +     1     1   -12.000    0.000  log_O18_usdb_j0p.txt\n   2   2 +     1     1   -10.000    2.000  log_O18_usdb_j4p.txt\n",
    )
    .unwrap();
    let output = ksh(&["levels", "--config", &config, "--run", "even"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["energy"], -13.0);
    assert_eq!(json[1]["excitation"], 2.0);
    assert_eq!(json[1]["wavefunction"], "O18_usdb_j4p.wav");
}

#[test]
fn levels_without_summary_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_campaign(dir.path());
    let output = ksh(&["levels", "--config", &config, "--run", "even"]);
    assert!(!output.status.success());
}

#[test]
fn plan_writes_a_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_campaign(dir.path());
    let out = dir.path().join("manifest.json");
    let output = ksh(&[
        "plan",
        "--config",
        &config,
        "--left",
        "even",
        "--right",
        "odd",
        "--out",
        &out.display().to_string(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let manifest: serde_json::Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
    assert_eq!(manifest["flipped"], true);
    assert_eq!(manifest["jobs"].as_array().unwrap().len(), 2);
    assert_eq!(manifest["jobs"][0]["status"]["state"], "unavailable");
}

#[test]
fn closure_writes_contributions() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("summary_As76_usdb.txt"),
        "   1   1 +     1     0   -7.000    0.000\n   2   2 +     1     0   -9.000    0.000\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("densities.yaml"),
        r#"
entries:
  - file: density_usdb_Se76j0p_As76j2p.txt
    bra: 0+1
    ket: 1+1
    components: [0.5]
  - file: density_usdb_As76j2p_Ge76j0p.txt
    bra: 1+1
    ket: 0+1
    components: [1.0]
"#,
    )
    .unwrap();
    let config = dir.path().join("closure.yaml");
    fs::write(
        &config,
        r#"
workdir: .
parent: Ge76
interaction: usdb.snt
initial: 0+1
final: 0+1
n_states: 5
operator:
  name: gt.op
  rank: 1
densities: densities.yaml
"#,
    )
    .unwrap();
    let out = dir.path().join("rows.csv");
    let elsewhere = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_ksh"))
        .arg("closure")
        .arg("--config")
        .arg(&config)
        .arg("--out")
        .arg(&out)
        .current_dir(elsewhere.path())
        .env_remove("RUST_LOG")
        .output()
        .expect("run ksh");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["total"], 0.25);

    let mut reader = csv::Reader::from_path(&out).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|row| row.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "1");
    assert_eq!(&rows[0][5], "2.00000000");
}
