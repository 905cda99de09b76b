use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ksh_core::StateLabel;
use ksh_run::{EnergyTable, RunDescriptor};
use ksh_transit::{closure_sum, ClosureInput, OperatorSpec, TabulatedDensity};

const INTERMEDIATE_STATES: u32 = 200;

fn label(text: &str) -> StateLabel {
    text.parse().expect("label")
}

fn bench_closure(c: &mut Criterion) {
    let daughter = RunDescriptor::parse("Se76", "jun45.snt", "2+1").expect("daughter");
    let parent = RunDescriptor::parse("Ge76", "jun45.snt", "2+1").expect("parent");
    let requests = format!(
        "1+{n},2+{n},3+{n}",
        n = INTERMEDIATE_STATES
    );
    let intermediate = RunDescriptor::parse("As76", "jun45.snt", &requests).expect("intermediate");

    let mut energies = EnergyTable::new();
    let mut densities = TabulatedDensity::default();
    for (j, code) in [(1, "j2p"), (2, "j4p"), (3, "j6p")] {
        for index in 1..=INTERMEDIATE_STATES {
            let state = label(&format!("{j}+{index}"));
            energies.insert(state, -12.0 + 0.01 * f64::from(index) + f64::from(j));
            densities.insert(
                format!("density_jun45_Se76j4p_As76{code}.txt"),
                label("2+1"),
                state,
                vec![0.1, 0.2],
            );
            densities.insert(
                format!("density_jun45_As76{code}_Ge76j4p.txt"),
                state,
                label("2+1"),
                vec![0.3],
            );
        }
    }
    let operator = OperatorSpec::gamow_teller("gt.op");
    let input = ClosureInput {
        final_run: &daughter,
        final_state: label("2+1"),
        initial_run: &parent,
        initial_state: label("2+1"),
        intermediate_run: &intermediate,
        intermediate_energies: &energies,
        ground_energy: None,
        operator: &operator,
        q_value: 1.0,
    };

    c.bench_function("closure_throughput", |b| {
        b.iter(|| closure_sum(black_box(&input), &densities).expect("closure"));
    });
}

criterion_group!(benches, bench_closure);
criterion_main!(benches);
