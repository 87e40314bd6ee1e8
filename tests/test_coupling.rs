use approx::assert_relative_eq;
use glove_retargeting::*;
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn ground_truth() -> DMatrix<f64> {
    DMatrix::from_row_slice(
        9,
        4,
        &[
            1.0, 0.0, 0.0, 0.0, //
            0.5, 0.2, 0.0, 0.0, //
            0.3, 0.7, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.4, 0.4, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.6, 0.5, //
            0.0, 0.0, 0.0, 1.0, //
            0.1, 0.0, 0.0, 0.9, //
        ],
    )
}

#[test]
fn test_estimate_known_coupling_with_noise() {
    let a_star = ground_truth();
    let mut rng = StdRng::seed_from_u64(42);
    let mut estimator = CouplingEstimator::new(4, 9);
    for _ in 0..500 {
        let axes = DVector::<f64>::from_fn(4, |_, _| rng.gen_range(0.0..1.5));
        let noise = DVector::<f64>::from_fn(9, |_, _| rng.gen_range(-1.0e-4..1.0e-4));
        let joints = &a_star * &axes + noise;
        estimator.record_sample(&axes, &joints).unwrap();
    }
    assert_eq!(estimator.samples().len(), 500);
    let coupling = estimator.estimate_coupling().unwrap();
    assert_eq!(coupling.matrix().shape(), (9, 4));
    assert_eq!(coupling.control_coefficient().shape(), (4, 9));
    assert_relative_eq!(coupling.matrix(), &a_star, epsilon = 1.0e-3);
    assert_relative_eq!(
        coupling.control_coefficient() * &a_star,
        DMatrix::<f64>::identity(4, 4),
        epsilon = 1.0e-3
    );
}

#[test]
fn test_estimate_exact_coupling() {
    let a_star = ground_truth();
    let mut estimator = CouplingEstimator::new(4, 9);
    for i in 0..4 {
        for k in 1..4 {
            let mut axes = DVector::zeros(4);
            axes[i] = 0.25 * k as f64;
            estimator.record_sample(&axes, &(&a_star * &axes)).unwrap();
        }
    }
    let coupling = estimator.estimate_coupling().unwrap();
    assert_relative_eq!(coupling.matrix(), &a_star, epsilon = 1.0e-9);
    let axes = DVector::from_vec(vec![0.1, 0.2, 0.3, 0.4]);
    let joints = coupling.joints_from_axes(&axes).unwrap();
    assert_relative_eq!(
        coupling.axes_from_joints(&joints).unwrap(),
        axes,
        epsilon = 1.0e-9
    );
}

fn assert_degenerate(estimator: &CouplingEstimator) {
    match estimator.estimate_coupling() {
        Err(Error::DegenerateCalibrationData { rank, required, .. }) => {
            assert!(rank < required);
        }
        Err(e) => panic!("unexpected error {}", e),
        Ok(c) => panic!("degenerate data produced a coupling {}", c.matrix()),
    }
}

#[test]
fn test_identical_samples_are_degenerate() {
    let a_star = ground_truth();
    let mut estimator = CouplingEstimator::new(4, 9);
    let axes = DVector::from_vec(vec![0.3, 0.1, 0.7, 0.2]);
    for _ in 0..50 {
        estimator.record_sample(&axes, &(&a_star * &axes)).unwrap();
    }
    assert_degenerate(&estimator);
}

#[test]
fn test_too_few_samples_are_degenerate() {
    let a_star = ground_truth();
    let mut estimator = CouplingEstimator::new(4, 9);
    assert_degenerate(&estimator);
    for i in 0..3 {
        let mut axes = DVector::zeros(4);
        axes[i] = 1.0;
        estimator.record_sample(&axes, &(&a_star * &axes)).unwrap();
    }
    assert_degenerate(&estimator);
}

#[test]
fn test_dependent_axes_are_degenerate() {
    let a_star = ground_truth();
    let mut rng = StdRng::seed_from_u64(1);
    let mut estimator = CouplingEstimator::new(4, 9);
    for _ in 0..100 {
        let a0: f64 = rng.gen_range(0.0..1.0);
        let a2: f64 = rng.gen_range(0.0..1.0);
        let a3: f64 = rng.gen_range(0.0..1.0);
        // the second axis always follows the first one
        let axes = DVector::from_vec(vec![a0, 2.0 * a0, a2, a3]);
        estimator.record_sample(&axes, &(&a_star * &axes)).unwrap();
    }
    assert_degenerate(&estimator);
}

#[test]
fn test_non_finite_samples_are_degenerate() {
    for bad in [f64::NAN, f64::INFINITY] {
        let mut estimator = CouplingEstimator::new(2, 3);
        estimator
            .record_sample(
                &DVector::from_vec(vec![bad, 1.0]),
                &DVector::from_vec(vec![1.0, 0.5, 0.0]),
            )
            .unwrap();
        for (a0, a1) in [(1.0, 0.0), (0.0, 1.0)] {
            let axes = DVector::from_vec(vec![a0, a1]);
            let joints = DVector::from_vec(vec![a0, 0.5 * (a0 + a1), a1]);
            estimator.record_sample(&axes, &joints).unwrap();
        }
        assert_degenerate(&estimator);
        assert_eq!(estimator.samples().len(), 3);
    }

    let mut estimator = CouplingEstimator::new(2, 3);
    for (a0, a1) in [(1.0, 0.0), (0.0, 1.0), (1.0, 1.0)] {
        let axes = DVector::from_vec(vec![a0, a1]);
        let joints = DVector::from_vec(vec![a0, f64::NAN, a1]);
        estimator.record_sample(&axes, &joints).unwrap();
    }
    assert_degenerate(&estimator);
}

#[test]
fn test_coupling_from_matrix_requires_full_column_rank() {
    let rank_one = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 2.0, 2.0, 0.5, 0.5]);
    assert!(matches!(
        Coupling::from_matrix(rank_one),
        Err(Error::DegenerateCalibrationData { .. })
    ));
    let coupling = Coupling::from_matrix(ground_truth()).unwrap();
    assert!(coupling.joints_from_axes(&DVector::zeros(9)).is_err());
    assert!(coupling.axes_from_joints(&DVector::zeros(4)).is_err());
}

#[test]
fn test_identity_coupling() {
    let coupling = Coupling::identity(15, 5);
    assert_eq!(coupling.joint_count(), 15);
    assert_eq!(coupling.axis_count(), 5);
    let axes = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    let joints = coupling.joints_from_axes(&axes).unwrap();
    assert_eq!(&joints.as_slice()[..5], axes.as_slice());
    assert!(joints.as_slice()[5..].iter().all(|v| *v == 0.0));
    assert_eq!(coupling.axes_from_joints(&joints).unwrap(), axes);
}
