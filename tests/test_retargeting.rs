use approx::assert_relative_eq;
use glove_retargeting::*;
use nalgebra::{DMatrix, DVector};
use serde_json::json;

fn hand_coupling() -> DMatrix<f64> {
    DMatrix::from_row_slice(
        6,
        2,
        &[
            1.0, 0.0, //
            0.6, 0.0, //
            0.3, 0.2, //
            0.0, 1.0, //
            0.0, 0.8, //
            0.1, 0.5, //
        ],
    )
}

fn coupled_hand() -> LinearHand {
    LinearHand::new(
        hand_coupling(),
        DMatrix::from_row_slice(2, 2, &[0.0, 2.0, 0.0, 2.0]),
    )
    .unwrap()
}

fn icub_like_hand() -> LinearHand {
    LinearHand::new(
        DMatrix::from_fn(15, 5, |r, c| if r / 3 == c { 1.0 / 3.0 } else { 0.0 }),
        DMatrix::from_fn(5, 2, |_, c| if c == 0 { 0.0 } else { 10.0 }),
    )
    .unwrap()
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_uncoupled_axis_reference() {
    init_logger();
    let config = json!({
        "samplingTime": 0.01,
        "fingersScaling": [1.0, 1.0, 1.0, 1.0, 1.0],
        "motorsJointsCoupled": false,
    });
    let mut fingers = FingersRetargeting::configure(icub_like_hand(), &config).unwrap();
    assert_eq!(fingers.axis_count(), 5);
    assert_eq!(fingers.joint_count(), 15);
    assert!(!fingers.is_calibrating());
    assert_eq!(
        fingers.coupling().unwrap().matrix(),
        &DMatrix::<f64>::identity(15, 5)
    );

    let reference = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    fingers.set_axis_reference(&reference).unwrap();
    assert_eq!(fingers.desired_axis_reference(), &reference);
    // no hidden state
    fingers.set_axis_reference(&reference).unwrap();
    assert_eq!(fingers.desired_axis_reference(), &reference);

    fingers.move_robot().unwrap();
    assert_eq!(fingers.controller().commanded(), &reference);
    assert_eq!(fingers.controller().move_count(), 1);
}

#[test]
fn test_scaling_is_applied() {
    let config = json!({
        "samplingTime": 0.01,
        "fingersScaling": [0.5, 2.0],
    });
    let mut fingers = FingersRetargeting::configure(coupled_hand(), &config).unwrap();
    fingers
        .set_axis_position_reference(&DVector::from_vec(vec![1.0, 0.25]))
        .unwrap();
    assert_eq!(fingers.desired_axis_reference().as_slice(), &[0.5, 0.5]);
    assert_eq!(fingers.scaling().as_slice(), &[0.5, 2.0]);
}

#[test]
fn test_wrong_size_keeps_previous_reference() {
    let config = json!({
        "samplingTime": 0.01,
        "fingersScaling": [1.0, 1.0],
        "motorsJointsCoupled": true,
        "CouplingMatrix": hand_coupling().transpose().as_slice().to_vec(),
    });
    let mut fingers = FingersRetargeting::configure(coupled_hand(), &config).unwrap();
    let reference = DVector::from_vec(vec![0.3, 0.4]);
    fingers.set_axis_reference(&reference).unwrap();
    let joints = &hand_coupling() * &reference;
    fingers.set_joint_reference(&joints).unwrap();

    assert!(matches!(
        fingers.set_axis_reference(&DVector::from_vec(vec![1.0, 2.0, 3.0])),
        Err(Error::SizeMismatch { expected: 2, actual: 3, .. })
    ));
    assert!(fingers
        .set_axis_velocity_reference(&DVector::from_vec(vec![1.0]))
        .is_err());
    assert!(matches!(
        fingers.set_joint_reference(&DVector::zeros(5)),
        Err(Error::SizeMismatch { expected: 6, actual: 5, .. })
    ));
    assert_relative_eq!(fingers.desired_axis_reference(), &reference, epsilon = 1.0e-12);
    assert_eq!(fingers.desired_joint_reference(), &joints);
}

#[test]
fn test_joint_reference_with_configured_coupling() {
    // row major joints x axes
    let flattened = (0..6)
        .flat_map(|r| (0..2).map(move |c| hand_coupling()[(r, c)]))
        .collect::<Vec<_>>();
    let config = json!({
        "samplingTime": 0.01,
        "fingersScaling": [1.0, 1.0],
        "motorsJointsCoupled": true,
        "doCalibration": false,
        "CouplingMatrix": flattened,
    });
    let mut fingers = FingersRetargeting::configure(coupled_hand(), &config).unwrap();
    assert_relative_eq!(
        fingers.coupling().unwrap().matrix(),
        &hand_coupling(),
        epsilon = 1.0e-12
    );
    let axes = DVector::from_vec(vec![0.3, 0.6]);
    fingers
        .set_joint_reference(&(&hand_coupling() * &axes))
        .unwrap();
    assert_relative_eq!(fingers.desired_axis_reference(), &axes, epsilon = 1.0e-9);
}

#[test]
fn test_velocity_reference_is_integrated() {
    let config = json!({
        "samplingTime": 0.1,
        "fingersScaling": [1.0, 2.0],
    });
    let mut fingers = FingersRetargeting::configure(coupled_hand(), &config).unwrap();
    let velocity = DVector::from_vec(vec![1.0, 1.0]);
    fingers.set_axis_velocity_reference(&velocity).unwrap();
    assert_relative_eq!(
        fingers.desired_axis_reference(),
        &DVector::from_vec(vec![0.05, 0.1]),
        epsilon = 1.0e-12
    );
    for _ in 0..100 {
        fingers.set_axis_velocity_reference(&velocity).unwrap();
    }
    // saturated by the hand limits
    assert_eq!(fingers.desired_axis_reference().as_slice(), &[2.0, 2.0]);
}

#[test]
fn test_feedback_failure_keeps_stale_values() {
    init_logger();
    let config = json!({
        "samplingTime": 0.01,
        "fingersScaling": [1.0, 1.0],
    });
    let mut fingers = FingersRetargeting::configure(coupled_hand(), &config).unwrap();
    fingers
        .set_axis_reference(&DVector::from_vec(vec![0.5, 1.0]))
        .unwrap();
    fingers.move_robot().unwrap();
    fingers.update_feedback().unwrap();
    assert_eq!(fingers.axis_measured_values().as_slice(), &[0.5, 1.0]);
    let joints = fingers.joint_measured_values().clone();

    fingers.controller_mut().set_feedback_available(false);
    fingers
        .set_axis_reference(&DVector::from_vec(vec![1.5, 1.5]))
        .unwrap();
    fingers.move_robot().unwrap();
    assert!(matches!(
        fingers.update_feedback(),
        Err(Error::FeedbackUnavailable { .. })
    ));
    assert_eq!(fingers.axis_measured_values().as_slice(), &[0.5, 1.0]);
    assert_eq!(fingers.joint_measured_values(), &joints);

    fingers.controller_mut().set_feedback_available(true);
    fingers.update_feedback().unwrap();
    assert_eq!(fingers.axis_measured_values().as_slice(), &[1.5, 1.5]);
}

#[test]
fn test_calibration_is_noop_when_not_calibrating() {
    let config = json!({
        "samplingTime": 0.01,
        "fingersScaling": [1.0, 1.0],
        "doCalibration": true,
    });
    // uncoupled hands never calibrate
    let mut fingers = FingersRetargeting::configure(coupled_hand(), &config).unwrap();
    assert!(!fingers.is_calibrating());
    assert!(!fingers.record_calibration_sample_random().unwrap());
    assert!(!fingers.record_calibration_sample_sinusoid(0.3, 0).unwrap());
    assert_eq!(fingers.calibration_sample_count(), 0);
    assert_eq!(fingers.controller().move_count(), 0);
}

fn calibrating_config(excitation: &str) -> serde_json::Value {
    json!({
        "samplingTime": 0.1,
        "fingersScaling": [1.0, 1.0],
        "motorsJointsCoupled": true,
        "doCalibration": true,
        "calibrationExcitation": excitation,
        "randomSeed": 7,
    })
}

#[test]
fn test_sinusoid_calibration() {
    init_logger();
    let mut fingers =
        FingersRetargeting::configure(coupled_hand(), &calibrating_config("sinusoid")).unwrap();
    assert!(fingers.is_calibrating());
    assert!(fingers.coupling().is_none());
    assert!(matches!(
        fingers.set_joint_reference(&DVector::zeros(6)),
        Err(Error::CouplingNotAvailable)
    ));
    assert!(fingers.record_calibration_sample_sinusoid(0.0, 2).is_err());

    let mut time = 0.0;
    for axis in 0..2 {
        for _ in 0..10 {
            assert!(fingers.record_calibration_sample_sinusoid(time, axis).unwrap());
            time += 0.1;
        }
    }
    assert_eq!(fingers.calibration_sample_count(), 20);
    assert_eq!(fingers.controller().move_count(), 20);

    let coupling = fingers.train_coupling_matrix().unwrap().clone();
    assert_relative_eq!(coupling.matrix(), &hand_coupling(), epsilon = 1.0e-9);
    assert!(!fingers.is_calibrating());
    assert!(!fingers.record_calibration_sample_sinusoid(time, 0).unwrap());
    assert_eq!(fingers.train_coupling_matrix().unwrap(), &coupling);

    let axes = DVector::from_vec(vec![0.7, 1.1]);
    fingers
        .set_joint_reference(&(&hand_coupling() * &axes))
        .unwrap();
    assert_relative_eq!(fingers.desired_axis_reference(), &axes, epsilon = 1.0e-9);
}

#[test]
fn test_random_calibration() {
    let mut fingers =
        FingersRetargeting::configure(coupled_hand(), &calibrating_config("random")).unwrap();
    for _ in 0..200 {
        assert!(fingers.record_calibration_sample_random().unwrap());
        for (v, range) in fingers
            .desired_axis_reference()
            .iter()
            .zip(fingers.integrator().limits())
        {
            assert!(range.is_valid(*v));
        }
    }
    let coupling = fingers.train_coupling_matrix().unwrap();
    assert_relative_eq!(coupling.matrix(), &hand_coupling(), epsilon = 1.0e-6);
}

#[test]
fn test_random_calibration_rejects_unusable_velocity_limits() {
    let unbounded = DMatrix::from_row_slice(2, 2, &[f64::NEG_INFINITY, f64::INFINITY, -1.0, 1.0]);
    assert!(matches!(
        coupled_hand().with_velocity_limits(unbounded),
        Err(Error::ConfigurationError { .. })
    ));

    let huge = DMatrix::from_row_slice(2, 2, &[-f64::MAX, f64::MAX, -1.0, 1.0]);
    let hand = coupled_hand().with_velocity_limits(huge).unwrap();
    let mut fingers = FingersRetargeting::configure(hand, &calibrating_config("random")).unwrap();
    assert!(matches!(
        fingers.record_calibration_sample_random(),
        Err(Error::ConfigurationError { .. })
    ));
    assert_eq!(fingers.calibration_sample_count(), 0);
    assert_eq!(fingers.controller().move_count(), 0);
    assert!(fingers.is_calibrating());
}

#[test]
fn test_train_without_calibration_returns_current_coupling() {
    let config = json!({
        "samplingTime": 0.01,
        "fingersScaling": [1.0, 1.0],
    });
    let mut fingers = FingersRetargeting::configure(coupled_hand(), &config).unwrap();
    assert_eq!(
        fingers.train_coupling_matrix().unwrap().matrix(),
        &DMatrix::<f64>::identity(6, 2)
    );
    assert!(!fingers.is_calibrating());
}

#[test]
fn test_degenerate_calibration_keeps_samples() {
    let mut fingers =
        FingersRetargeting::configure(coupled_hand(), &calibrating_config("sinusoid")).unwrap();
    for i in 0..5 {
        fingers
            .record_calibration_sample_sinusoid(0.1 * i as f64, 0)
            .unwrap();
    }
    assert!(matches!(
        fingers.train_coupling_matrix(),
        Err(Error::DegenerateCalibrationData { .. })
    ));
    assert!(fingers.is_calibrating());
    assert_eq!(fingers.calibration_sample_count(), 5);
    for i in 0..5 {
        fingers
            .record_calibration_sample_sinusoid(0.1 * i as f64, 1)
            .unwrap();
    }
    assert!(fingers.train_coupling_matrix().is_ok());
}

#[test]
fn test_configuration_errors() {
    let missing_time = json!({ "fingersScaling": [1.0, 1.0] });
    assert!(matches!(
        FingersRetargeting::configure(coupled_hand(), &missing_time),
        Err(Error::ConfigurationError { .. })
    ));
    let wrong_scaling = json!({ "samplingTime": 0.01, "fingersScaling": [1.0] });
    assert!(FingersRetargeting::configure(coupled_hand(), &wrong_scaling).is_err());
    let missing_matrix = json!({
        "samplingTime": 0.01,
        "fingersScaling": [1.0, 1.0],
        "motorsJointsCoupled": true,
    });
    assert!(FingersRetargeting::configure(coupled_hand(), &missing_matrix).is_err());
    let rank_deficient = json!({
        "samplingTime": 0.01,
        "fingersScaling": [1.0, 1.0],
        "motorsJointsCoupled": true,
        "CouplingMatrix": [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    });
    assert!(matches!(
        FingersRetargeting::configure(coupled_hand(), &rank_deficient),
        Err(Error::ConfigurationError { .. })
    ));
    let unknown_excitation = json!({
        "samplingTime": 0.01,
        "fingersScaling": [1.0, 1.0],
        "calibrationExcitation": "chirp",
    });
    assert!(FingersRetargeting::configure(coupled_hand(), &unknown_excitation).is_err());
}
