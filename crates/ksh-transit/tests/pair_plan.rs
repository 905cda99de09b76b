use std::fs;
use std::path::Path;

use ksh_core::{StateLabel, TruncationSpec};
use ksh_run::{CampaignConfig, RunDescriptor};
use ksh_transit::{
    enumerate_pairs, CampaignManifest, DensityKind, PairOptions, PairStatus,
};

fn label(text: &str) -> StateLabel {
    text.parse().expect("label")
}

fn run(nuclide: &str, states: &str) -> RunDescriptor {
    RunDescriptor::parse(nuclide, "usdb.snt", states).expect("run")
}

fn touch(dir: &Path, names: &[&str]) {
    for name in names {
        fs::write(dir.join(name), "").expect("touch");
    }
}

#[test]
fn intra_nuclide_mirrors_are_planned_once() {
    let dir = tempfile::tempdir().unwrap();
    let o18 = run("O18", "0+2,2+1");
    let plan = enumerate_pairs(&o18, &o18, None, &PairOptions::default(), dir.path());
    let files: Vec<&str> = plan.jobs().iter().map(|job| job.density_file.as_str()).collect();
    assert_eq!(
        files,
        vec![
            "density_usdb_O18j0p_O18j0p.txt",
            "density_usdb_O18j0p_O18j4p.txt",
            "density_usdb_O18j4p_O18j4p.txt",
        ]
    );

    let direct = plan.resolve(label("0+2"), label("2+1")).expect("direct");
    assert!(!direct.swapped);
    let mirrored = plan.resolve(label("2+1"), label("0+2")).expect("mirror");
    assert!(mirrored.swapped);
    assert_eq!(mirrored.job, direct.job);
}

#[test]
fn explicit_symmetric_requests_yield_one_entry() {
    let dir = tempfile::tempdir().unwrap();
    let o18 = run("O18", "0+3,2+2");
    let pairs = [(label("0+3"), label("2+2")), (label("2+2"), label("0+3"))];
    let plan = enumerate_pairs(&o18, &o18, Some(&pairs), &PairOptions::default(), dir.path());
    assert_eq!(plan.jobs().len(), 1);
    assert_eq!(plan.jobs()[0].bra_state, label("0+3"));
    assert!(plan.resolve(label("2+2"), label("0+3")).unwrap().swapped);
}

#[test]
fn different_interactions_are_never_deduplicated() {
    let dir = tempfile::tempdir().unwrap();
    let ne20 = run("Ne20", "0+1,2+1");
    let ne20_other = RunDescriptor::parse("Ne20", "sdba.snt", "0+1,2+1").unwrap();
    let plan = enumerate_pairs(&ne20, &ne20_other, None, &PairOptions::default(), dir.path());
    assert_eq!(plan.jobs().len(), 4);
}

#[test]
fn different_truncations_are_never_deduplicated() {
    let dir = tempfile::tempdir().unwrap();
    let full = run("O18", "0+1,2+1");
    let hw2 = run("O18", "0+1,2+1").with_truncation(TruncationSpec::hw(2));
    let plan = enumerate_pairs(&full, &hw2, None, &PairOptions::default(), dir.path());
    assert!(!plan.flipped());
    assert_eq!(plan.jobs().len(), 4);
    assert!(plan
        .jobs()
        .iter()
        .any(|job| job.density_file == "density_usdb_hw2_O18j4p_O18j0p.txt"));

    let resolved = plan.resolve(label("2+1"), label("0+1")).expect("direct");
    assert!(!resolved.swapped);
    assert_eq!(resolved.job.bra_wavefunction, "O18_usdb_j4p.wav");
    assert_eq!(resolved.job.ket_wavefunction, "O18_usdb_hw2_j0p.wav");
}

#[test]
fn parity_changing_pairs_can_be_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let o18 = run("O18", "0+1,1-1");
    let options = PairOptions {
        parity_mix: false,
        ..PairOptions::default()
    };
    let plan = enumerate_pairs(&o18, &o18, None, &options, dir.path());
    assert_eq!(plan.jobs().len(), 2);
    assert!(plan
        .jobs()
        .iter()
        .all(|job| job.bra_state.parity == job.ket_state.parity));
    assert!(plan.resolve(label("1-1"), label("0+1")).is_none());
}

#[test]
fn availability_follows_the_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    let f19 = run("F19", "0.5+1");
    let o18 = run("O18", "0+1");

    let plan = enumerate_pairs(&f19, &o18, None, &PairOptions::default(), dir.path());
    match &plan.jobs()[0].status {
        PairStatus::Unavailable { missing } => assert_eq!(missing.len(), 4),
        other => panic!("expected unavailable, got {other:?}"),
    }
    assert_eq!(plan.submittable().count(), 0);
    assert_eq!(plan.unavailable().count(), 1);

    touch(
        dir.path(),
        &["F19_usdb_p.ptn", "F19_usdb_j1p.wav", "O18_usdb_p.ptn"],
    );
    let plan = enumerate_pairs(&f19, &o18, None, &PairOptions::default(), dir.path());
    assert_eq!(
        plan.jobs()[0].status,
        PairStatus::Unavailable {
            missing: vec![dir.path().join("O18_usdb_j0p.wav")]
        }
    );

    touch(dir.path(), &["O18_usdb_j0p.wav"]);
    let plan = enumerate_pairs(&f19, &o18, None, &PairOptions::default(), dir.path());
    assert_eq!(plan.jobs()[0].status, PairStatus::Pending);
    assert_eq!(plan.submittable().count(), 1);

    touch(dir.path(), &["density_usdb_F19j1p_O18j0p.txt"]);
    let plan = enumerate_pairs(&f19, &o18, None, &PairOptions::default(), dir.path());
    assert_eq!(plan.jobs()[0].status, PairStatus::Complete);
}

#[test]
fn eigen_pairs_follow_the_flip() {
    let dir = tempfile::tempdir().unwrap();
    let o18 = run("O18", "0+1");
    let f19 = run("F19", "0.5+1");
    let options = PairOptions {
        eigen_pairs: vec![(1, 2), (3, 4)],
        ..PairOptions::default()
    };
    let plan = enumerate_pairs(&o18, &f19, None, &options, dir.path());
    assert!(plan.flipped());
    let job = &plan.jobs()[0];
    assert_eq!(job.eigen_pairs, vec![(2, 1), (4, 3)]);
    assert_eq!(job.bra_partition, "F19_usdb_p.ptn");
    assert_eq!(job.ket_wavefunction, "O18_usdb_j0p.wav");
    assert_eq!(job.interaction, Path::new("usdb.snt"));
}

#[test]
fn manifest_hash_ignores_status() {
    let dir = tempfile::tempdir().unwrap();
    let f19 = run("F19", "0.5+1,2.5+1");
    let o18 = run("O18", "0+1");
    let options = PairOptions {
        kind: DensityKind::StrengthFunction,
        ..PairOptions::default()
    };
    let before = enumerate_pairs(&o18, &f19, None, &options, dir.path());
    let first = CampaignManifest::new(&o18, &f19, &before).unwrap();
    assert_eq!(first.counts(), (0, 0, 2));
    assert_eq!(first.bra.nuclide().to_string(), "F19");

    touch(
        dir.path(),
        &["F19_usdb_p.ptn", "F19_usdb_j1p.wav", "O18_usdb_p.ptn", "O18_usdb_j0p.wav"],
    );
    let after = enumerate_pairs(&o18, &f19, None, &options, dir.path());
    let second = CampaignManifest::new(&o18, &f19, &after).unwrap();
    assert_eq!(second.counts(), (1, 0, 1));
    assert_eq!(first.plan_hash, second.plan_hash);
    assert_eq!(first.plan_hash.len(), 64);

    let path = dir.path().join("manifest.json");
    second.write(&path).unwrap();
    let reread: CampaignManifest =
        ksh_core::serde::from_json_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(reread, second);

    let parity_only = PairOptions {
        parity_mix: false,
        ..options
    };
    let other = enumerate_pairs(&o18, &f19, None, &parity_only, dir.path());
    let third = CampaignManifest::new(&o18, &f19, &other).unwrap();
    assert_ne!(third.plan_hash, first.plan_hash);
}

#[test]
fn options_come_from_the_campaign_file() {
    let config = CampaignConfig {
        parity_mix: false,
        eigen_pairs: vec![(1, 1)],
        ..CampaignConfig::default()
    };
    let options = PairOptions::from_campaign(&config, DensityKind::Density);
    assert!(!options.parity_mix);
    assert_eq!(options.eigen_pairs, vec![(1, 1)]);
}
