//! Integration tests for the moment engine through the public API.

use splitmig_spectrum::{Engine, MigrationMatrix, MomentEngine, Spectrum, SpectrumError, Topology};

fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps * (1.0 + a.abs().max(b.abs()))
}

/// Ancestral equilibrium split into three populations.
fn three_way(engine: &MomentEngine, n: usize) -> Spectrum {
    let fs = engine.steady_state(3 * n).unwrap();
    let fs = engine.split(fs, 0, n, 2 * n).unwrap();
    engine.split(fs, 1, n, n).unwrap()
}

#[test]
fn test_three_population_mass_balance() {
    let engine = MomentEngine::new().with_theta(1.5);
    let fs = three_way(&engine, 4);
    assert_eq!(fs.sample_sizes(), vec![4, 4, 4]);
    let before = fs.sum();

    let migration = MigrationMatrix::from_topology(
        Topology::AsymmetricAll,
        3,
        &[0.1, 0.2, 0.3, 0.4, 0.5, 0.6],
    )
    .unwrap();
    let out = engine
        .integrate(fs, &[1.0, 0.7, 2.0], 0.2, &migration, None)
        .unwrap();

    assert!(out.is_finite());
    assert!(approx_eq(out.sum(), before + 0.2 * 1.5 * 12.0 / 2.0, 1e-9));
}

#[test]
fn test_isolated_populations_evolve_independently() {
    // Without migration the marginal of each population follows its own
    // one-population dynamics.
    let engine = MomentEngine::new();
    let fs = engine.steady_state(10).unwrap();
    let joint = engine.split(fs.clone(), 0, 5, 5).unwrap();
    let joint = engine
        .integrate(joint, &[0.5, 3.0], 0.3, &MigrationMatrix::zeros(2), None)
        .unwrap();

    let alone = engine
        .integrate(fs.project(0, 5).unwrap(), &[0.5], 0.3, &MigrationMatrix::zeros(1), None)
        .unwrap();
    let marginal = joint.marginalize(1).unwrap();
    // Cell 0 also collects the new mutations of the summed-out population.
    for i in 1..=5 {
        assert!(approx_eq(
            marginal.get(&[i]).unwrap(),
            alone.get(&[i]).unwrap(),
            1e-8
        ));
    }
}

/// Every cell except the all-ancestral and all-derived corners.
fn polymorphic(fs: &Spectrum) -> Vec<f64> {
    let cells: Vec<f64> = fs.data().iter().copied().collect();
    cells[1..cells.len() - 1].to_vec()
}

#[test]
fn test_sample_size_consistency_under_migration() {
    // Integrating 4 + 4 samples directly agrees with integrating 30 + 30 and
    // projecting down. The corners are skipped: their mutation input depends
    // on the sample size.
    let engine = MomentEngine::new();
    let migration = MigrationMatrix::from_topology(Topology::SymmetricAll, 2, &[0.5]).unwrap();
    let evolve = |n: usize| {
        let fs = engine.split(engine.steady_state(2 * n).unwrap(), 0, n, n).unwrap();
        engine.integrate(fs, &[1.0, 1.0], 1.0, &migration, None).unwrap()
    };

    let direct = evolve(4);
    let projected = evolve(30).project(0, 4).unwrap().project(1, 4).unwrap();
    assert_eq!(projected.sample_sizes(), vec![4, 4]);
    for (a, b) in polymorphic(&direct).into_iter().zip(polymorphic(&projected)) {
        assert!((a - b).abs() < 1e-2, "{a} vs {b}");
        assert!((a - b).abs() < 0.1 * b, "{a} vs {b}");
    }
}

#[test]
fn test_polymorphic_cells_stay_non_negative_under_migration() {
    let engine = MomentEngine::new();
    let fs = engine.split(engine.steady_state(18).unwrap(), 0, 10, 8).unwrap();
    for rates in [[3.0, 0.5], [0.5, 3.0], [3.0, 3.0]] {
        let migration =
            MigrationMatrix::from_topology(Topology::AsymmetricAll, 2, &rates).unwrap();
        let out = engine
            .integrate(fs.clone(), &[0.5, 2.0], 1.0, &migration, None)
            .unwrap();
        assert!(out.is_finite());
        for value in polymorphic(&out) {
            assert!(value >= 0.0, "{rates:?}: {value}");
        }
    }
}

fn equilibrium_of<E: Engine>(engine: E, n: usize) -> Spectrum {
    engine.steady_state(n).unwrap()
}

#[test]
fn test_engine_by_reference() {
    let engine = MomentEngine::new().with_theta(3.0);
    assert_eq!(equilibrium_of(&engine, 5), equilibrium_of(engine, 5));
}

#[test]
fn test_invalid_migration_dimension() {
    let engine = MomentEngine::new();
    let fs = three_way(&engine, 2);
    let err = engine
        .integrate(fs, &[1.0, 1.0, 1.0], 0.1, &MigrationMatrix::zeros(2), None)
        .unwrap_err();
    assert_eq!(
        err,
        SpectrumError::DimensionMismatch {
            what: "migration matrix",
            expected: 3,
            found: 2
        }
    );
}

#[test]
fn test_spectrum_json_round_trip() {
    let engine = MomentEngine::new();
    let fs = engine.split(engine.steady_state(4).unwrap(), 0, 2, 2).unwrap();
    let json = serde_json::to_string(&fs).unwrap();
    let back: Spectrum = serde_json::from_str(&json).unwrap();
    assert_eq!(back, fs);
}
