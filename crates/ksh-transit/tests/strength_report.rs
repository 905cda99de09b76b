use std::fs;
use std::path::PathBuf;

use ksh_core::{KshError, NuclideId};
use ksh_run::{RunDescriptor, ZeroBodyOffset};
use ksh_transit::{
    aggregate_espe, enumerate_pairs, espe_neighbours, parse_strength_report, read_strength_report,
    strength_from_plan, DensityKind, EspeMode, OrbitLabel, PairOptions,
};

const REPORT: &str = "SF_usdb_O17j5p_O16j0p.txt";

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn d52() -> OrbitLabel {
    OrbitLabel { n: 0, l: 2, j2: 5, pn: -1 }
}

fn s12() -> OrbitLabel {
    OrbitLabel { n: 1, l: 0, j2: 1, pn: -1 }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn orbits_collect_strength_and_centroid() {
    let zero = ZeroBodyOffset(0.0);
    let report = read_strength_report(&fixture(REPORT), &zero, &zero, None).unwrap();
    assert_eq!(report.orbits.len(), 2);
    let d = report.get(&d52()).unwrap();
    assert!(close(d.sum_sf, 1.2));
    assert!(close(d.centroid, 1.3));
    let s = report.get(&s12()).unwrap();
    assert!(close(s.sum_sf, 1.5));
    assert!(close(s.centroid, 5.75));
}

#[test]
fn state_limit_drops_high_ordinals() {
    let zero = ZeroBodyOffset(0.0);
    let report = read_strength_report(&fixture(REPORT), &zero, &zero, Some(2)).unwrap();
    let s = report.get(&s12()).unwrap();
    assert!(close(s.sum_sf, 1.0));
    assert!(close(s.centroid, 3.5));
}

#[test]
fn zero_body_terms_shift_the_centroid() {
    let report =
        read_strength_report(&fixture(REPORT), &ZeroBodyOffset(-1.0), &ZeroBodyOffset(-2.0), None)
            .unwrap();
    assert!(close(report.get(&d52()).unwrap().centroid, 1.5));
    assert!(close(report.get(&d52()).unwrap().sum_sf, 1.2));
}

#[test]
fn table_without_orbit_is_rejected() {
    let text = format!(
        "{}\n  1(   1)  -3.0  0(   1)  -10.0  1.0  1.0\n\n",
        ksh_transit::TABLE_HEADER
    );
    let zero = ZeroBodyOffset(0.0);
    let err = parse_strength_report(&text, &zero, &zero, None).unwrap_err();
    assert!(matches!(err, KshError::Format(_)));
}

#[test]
fn unterminated_table_is_still_recorded() {
    let text = format!(
        "orbit :    0    2    3   1\n{}\n  3(   1)  -3.0  0(   1)  -10.0  1.0  2.0",
        ksh_transit::TABLE_HEADER
    );
    let zero = ZeroBodyOffset(0.0);
    let report = parse_strength_report(&text, &zero, &zero, None).unwrap();
    let orbit = OrbitLabel { n: 0, l: 2, j2: 3, pn: 1 };
    assert!(close(report.get(&orbit).unwrap().sum_sf, 2.0));
    assert!(close(report.get(&orbit).unwrap().centroid, 3.5));
}

#[test]
fn missing_report_is_not_ready() {
    let zero = ZeroBodyOffset(0.0);
    let err = read_strength_report(&fixture("SF_absent.txt"), &zero, &zero, None).unwrap_err();
    assert!(err.is_missing_artifact());
}

#[test]
fn aggregation_sums_orbitwise() {
    let zero = ZeroBodyOffset(0.0);
    let one = read_strength_report(&fixture(REPORT), &zero, &zero, None).unwrap();
    let total = aggregate_espe(&[one.clone(), one]);
    assert!(close(total.get(&d52()).unwrap().sum_sf, 2.4));
    assert!(close(total.get(&s12()).unwrap().centroid, 11.5));
}

#[test]
fn neighbours_follow_the_mode() {
    let ca40: NuclideId = "Ca40".parse().unwrap();
    let names = |mode| -> Vec<String> {
        espe_neighbours(ca40, mode)
            .unwrap()
            .into_iter()
            .map(|nuclide| nuclide.to_string())
            .collect()
    };
    assert_eq!(names(EspeMode::Hole), vec!["K39", "Ca39"]);
    assert_eq!(names(EspeMode::Particle), vec!["Sc41", "Ca41"]);
    assert_eq!(names(EspeMode::Both).len(), 4);
    assert_eq!("particle".parse::<EspeMode>().unwrap(), EspeMode::Particle);
}

#[test]
fn plan_reports_are_summed_and_missing_ones_skipped() {
    let dir = tempfile::tempdir().unwrap();
    fs::copy(fixture(REPORT), dir.path().join(REPORT)).unwrap();
    let o16 = RunDescriptor::parse("O16", "usdb.snt", "0+1").unwrap();
    let o17 = RunDescriptor::parse("O17", "usdb.snt", "2.5+1,0.5+1").unwrap();
    let options = PairOptions {
        kind: DensityKind::StrengthFunction,
        ..PairOptions::default()
    };
    let plan = enumerate_pairs(&o16, &o17, None, &options, dir.path());
    assert!(plan.flipped());
    assert_eq!(plan.jobs()[0].density_file, REPORT);

    // left is O16 and becomes the ket
    let report = strength_from_plan(
        &plan,
        dir.path(),
        &ZeroBodyOffset(-2.0),
        &ZeroBodyOffset(-1.0),
        None,
    )
    .unwrap();
    assert!(close(report.get(&d52()).unwrap().centroid, 1.5));
}
