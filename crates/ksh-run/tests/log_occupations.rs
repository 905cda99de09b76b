use std::path::PathBuf;

use ksh_core::{KshError, Parity};
use ksh_run::{parse_log, read_logs, ZeroBodyOffset};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn records_collect_their_tagged_lines() {
    let text = std::fs::read_to_string(fixture("log_O18_usdb_j0p.txt")).unwrap();
    let records = parse_log(&text, "log_O18_usdb_j0p.txt", &ZeroBodyOffset(1.0));
    assert_eq!(records.len(), 2);

    let ground = &records[0];
    assert_eq!(ground.eigen_index, 1);
    assert_eq!(ground.energy, -11.0);
    assert_eq!(ground.j_value(), 0.0);
    assert_eq!(ground.parity, Parity::Plus);
    assert_eq!(ground.isospin2, Some(2));
    assert_eq!(ground.proton, vec![0.0, 0.0, 0.0]);
    assert_eq!(ground.proton_total(), 0.0);
    assert!((ground.neutron_total() - 2.0).abs() < 1e-9);
    assert_eq!(ground.hw_distribution.get(&0), Some(&1.0));

    let excited = &records[1];
    assert_eq!(excited.isospin2, Some(2));
    assert_eq!(excited.hw_distribution.len(), 2);
    assert_eq!(excited.hw_distribution.get(&2), Some(&0.1));
}

#[test]
fn odd_mass_headers_keep_half_integer_spin() {
    let text = "   1  <H>:   -3.20000  <JJ>:   3.75000  J:  3/2  prty -1\n";
    let records = parse_log(text, "log_F19_usdb_j3n.txt", &ZeroBodyOffset(0.0));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].j.twice(), 3);
    assert_eq!(records[0].parity, Parity::Minus);
    assert!(records[0].hw_distribution.is_empty());
    assert_eq!(records[0].isospin2, None);
}

#[test]
fn malformed_headers_are_dropped() {
    let text = "   x  <H>:  -12.0  <JJ>: 0.0  J: 0/2 prty 1\n <p Nj> 1.0\n";
    assert!(parse_log(text, "log.txt", &ZeroBodyOffset(0.0)).is_empty());
}

#[test]
fn degenerate_records_within_one_log_are_separated() {
    let text = "   1  <H>:  -5.00000  <JJ>: 0.0  J:  0/2  prty  1\n   2  <H>:  -5.00000  <JJ>: 0.0  J:  0/2  prty  1\n";
    let records = parse_log(text, "log_O18_usdb_j0p.txt", &ZeroBodyOffset(0.0));
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].energy, -5.0);
    assert!(records[1].energy > records[0].energy);
    assert!(records[1].energy - records[0].energy < 1e-3);
}

#[test]
fn reading_logs_merges_and_orders_by_energy() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("log_a.txt");
    let b = dir.path().join("log_b.txt");
    std::fs::write(&a, "   1  <H>:  -5.00000  <JJ>: 0.0  J:  0/2  prty  1\n").unwrap();
    std::fs::write(&b, "   1  <H>:  -5.00000  <JJ>: 6.0  J:  4/2  prty  1\n   2  <H>:  -7.00000  <JJ>: 6.0  J:  4/2  prty  1\n").unwrap();
    let records = read_logs(&[a.as_path(), b.as_path()], &ZeroBodyOffset(0.0)).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].energy, -7.0);
    assert_ne!(records[1].energy, records[2].energy);

    let missing = dir.path().join("log_c.txt");
    let err = read_logs(&[missing.as_path()], &ZeroBodyOffset(0.0)).unwrap_err();
    assert!(matches!(err, KshError::MissingArtifact(_)));
}
