use ksh_core::{KshError, OrbitWindow, TruncationSpec};

#[test]
fn empty_truncation_has_no_fragment() {
    assert!(TruncationSpec::none().is_none());
    assert_eq!(TruncationSpec::none().fragment(), "");
}

#[test]
fn hw_precedes_orbit_windows() {
    let orbits = TruncationSpec::parse_orbits("3_0_4-1_0_2").unwrap();
    let spec = TruncationSpec::new(Some(2), orbits).unwrap();
    assert_eq!(spec.fragment(), "_hw2_ph1_0_2-3_0_4");
    assert_eq!(TruncationSpec::hw(4).fragment(), "_hw4");
}

#[test]
fn window_order_does_not_change_the_name() {
    let a = TruncationSpec::new(None, TruncationSpec::parse_orbits("1_0_2-3_0_4").unwrap()).unwrap();
    let b = TruncationSpec::new(None, TruncationSpec::parse_orbits("3_0_4-1_0_2").unwrap()).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.fragment(), b.fragment());
}

#[test]
fn invalid_windows_are_rejected() {
    assert!(matches!("1_3_2".parse::<OrbitWindow>(), Err(KshError::Format(_))));
    assert!(matches!("1_3".parse::<OrbitWindow>(), Err(KshError::Format(_))));
    let duplicate = TruncationSpec::parse_orbits("1_0_2-1_0_4").unwrap();
    assert!(TruncationSpec::new(None, duplicate).is_err());
}

#[test]
fn yaml_uses_the_solver_grammar() {
    let spec: TruncationSpec = serde_yaml::from_str("hw: 2\nph: 3_0_4-1_0_2\n").unwrap();
    assert_eq!(spec.hw_cutoff(), Some(2));
    assert_eq!(spec.orbit_string().as_deref(), Some("1_0_2-3_0_4"));
    let text = serde_yaml::to_string(&spec).unwrap();
    let back: TruncationSpec = serde_yaml::from_str(&text).unwrap();
    assert_eq!(back, spec);
}
