use ksh_core::{NuclideId, StateLabel};
use ksh_run::RunDescriptor;
use ksh_transit::{order, DensityFileKey, DensityKind};
use proptest::prelude::*;

fn label(text: &str) -> StateLabel {
    text.parse().expect("label")
}

fn run(nuclide: &str, states: &str) -> RunDescriptor {
    RunDescriptor::parse(nuclide, "usdb.snt", states).expect("run")
}

#[test]
fn more_protons_take_the_bra() {
    let o18 = run("O18", "0+1");
    let f19 = run("F19", "0.5+1");
    let ordered = order(&o18, &f19);
    assert!(ordered.flipped);
    assert_eq!(ordered.bra.nuclide().to_string(), "F19");
    assert_eq!(ordered.orient("left", "right"), ("right", "left"));
}

#[test]
fn equal_protons_compare_mass() {
    let o17 = run("O17", "2.5+1");
    let o18 = run("O18", "0+1");
    assert!(order(&o17, &o18).flipped);
    assert!(!order(&o18, &o17).flipped);
}

#[test]
fn proton_number_beats_mass() {
    // N16 has more nucleons, O14 more protons
    let n16 = run("N16", "2-1");
    let o14 = run("O14", "0+1");
    let ordered = order(&n16, &o14);
    assert!(ordered.flipped);
    assert_eq!(ordered.bra.nuclide().to_string(), "O14");
}

#[test]
fn identical_nuclides_keep_the_left_bra() {
    let a = run("Ne20", "0+1");
    let b = run("Ne20", "2+1");
    let ordered = order(&a, &b);
    assert!(!ordered.flipped);
    assert_eq!(ordered.bra.states(), a.states());
    assert!(ordered.is_intra_nuclide());
}

#[test]
fn density_names_follow_the_bra() {
    let o18 = run("O18", "0+1");
    let f19 = run("F19", "0.5+1");
    let key = DensityFileKey::new(&o18, label("0+1"), &f19, label("0.5+1"), DensityKind::Density);
    assert_eq!(key.filename(), "density_usdb_F19j1p_O18j0p.txt");
    assert_eq!(key.bra_state(), label("0.5+1"));
    assert_eq!(key.ket_state(), label("0+1"));

    let sf = DensityFileKey::new(
        &f19,
        label("0.5+1"),
        &o18,
        label("0+1"),
        DensityKind::StrengthFunction,
    );
    assert_eq!(sf.filename(), "SF_usdb_F19j1p_O18j0p.txt");
    assert!(!sf.flipped());
}

#[test]
fn density_names_carry_the_ket_truncation() {
    let truncated = run("O18", "0+1").with_truncation(ksh_core::TruncationSpec::hw(2));
    let f19 = run("F19", "+1");
    let key = DensityFileKey::new(&truncated, label("0+1"), &f19, label("+1"), DensityKind::Density);
    assert_eq!(key.filename(), "density_usdb_hw2_F19m1p_O18j0p.txt");
}

fn nuclide_strategy() -> impl Strategy<Value = NuclideId> {
    (1u32..40, 0u32..40).prop_map(|(z, n)| NuclideId::new(z, n).expect("nuclide"))
}

fn state_strategy() -> impl Strategy<Value = StateLabel> {
    (0u32..10, any::<bool>(), 1u32..5).prop_map(|(j2, plus, index)| {
        let parity = if plus {
            ksh_core::Parity::Plus
        } else {
            ksh_core::Parity::Minus
        };
        StateLabel::new(ksh_core::Spin::from_twice(j2), parity, index)
    })
}

proptest! {
    #[test]
    fn ordering_is_symmetric(l in nuclide_strategy(), r in nuclide_strategy()) {
        prop_assume!(l.z() != r.z() || l.a() != r.a());
        let left = RunDescriptor::new(l, ksh_run::Interaction::new("usdb.snt"), vec![], Default::default());
        let right = RunDescriptor::new(r, ksh_run::Interaction::new("usdb.snt"), vec![], Default::default());
        let forward = order(&left, &right);
        let backward = order(&right, &left);
        prop_assert_eq!(forward.bra.nuclide(), backward.bra.nuclide());
        prop_assert_eq!(forward.ket.nuclide(), backward.ket.nuclide());
        prop_assert_ne!(forward.flipped, backward.flipped);
    }

    #[test]
    fn density_name_ignores_argument_order(
        l in nuclide_strategy(),
        r in nuclide_strategy(),
        ls in state_strategy(),
        rs in state_strategy(),
    ) {
        prop_assume!(l.z() != r.z() || l.a() != r.a());
        let left = RunDescriptor::new(l, ksh_run::Interaction::new("usdb.snt"), vec![], Default::default());
        let right = RunDescriptor::new(r, ksh_run::Interaction::new("usdb.snt"), vec![], Default::default());
        let forward = DensityFileKey::new(&left, ls, &right, rs, DensityKind::Density);
        let backward = DensityFileKey::new(&right, rs, &left, ls, DensityKind::Density);
        prop_assert_eq!(forward.filename(), backward.filename());
        prop_assert_eq!(forward.bra_state(), backward.bra_state());
        prop_assert_eq!(forward.ket_state(), backward.ket_state());
    }
}
