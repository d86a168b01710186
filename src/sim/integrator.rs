use nalgebra::DVector;

use crate::dynamics::state::StateVector;
use crate::error::{LanderError, Result};
use crate::gnc::LinearStateSpaceModel;

// ---------------------------------------------------------------------------
// Explicit Euler step of the autonomous linear system:  x' = x + (A x) dt
// ---------------------------------------------------------------------------

/// One fixed-step Euler advance. B·u is deliberately not added.
pub fn euler_step(model: &LinearStateSpaceModel, x: &DVector<f64>, dt: f64) -> Result<DVector<f64>> {
    let dx = model.derivative(x)?;
    Ok(x + dx * dt)
}

/// Predict the next 6-state snapshot from the current one.
pub fn predict(model: &LinearStateSpaceModel, current: &StateVector, dt: f64) -> Result<StateVector> {
    let next = euler_step(model, &current.to_dvector(), dt)?;
    StateVector::from_dvector(&next).ok_or_else(|| {
        LanderError::dimension_mismatch("predicted state", "6", next.len().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gnc::model;
    use approx::assert_relative_eq;

    #[test]
    fn matches_hand_computed_step() {
        let a = [
            [0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, -0.5, 0.0, 0.0, 2.0, 0.0],
            [0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, -1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
            [0.0, 0.0, 0.0, 0.0, -4.0, -0.2],
        ];
        let b = [[0.0, 1.0]; 6];
        let c = [
            [1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
        ];
        let m = LinearStateSpaceModel::from_tables(&a, &b, &c).unwrap();
        let x = StateVector::new(1.0, 2.0, 3.0, 4.0, 0.5, -1.0);
        let dt = 0.01;

        let next = predict(&m, &x, dt).unwrap();

        // A x = [2, -1 + 1, 4, -3, -1, -2 + 0.2]
        assert_relative_eq!(next.x(), 1.0 + 2.0 * dt);
        assert_relative_eq!(next.vx(), 2.0 + 0.0 * dt);
        assert_relative_eq!(next.y(), 3.0 + 4.0 * dt);
        assert_relative_eq!(next.vy(), 4.0 - 3.0 * dt);
        assert_relative_eq!(next.theta(), 0.5 - 1.0 * dt);
        assert_relative_eq!(next.omega(), -1.0 - 1.8 * dt);
    }

    #[test]
    fn input_matrix_is_ignored() {
        // Same A, different B: identical step.
        let auto = model::autonomous().unwrap();
        let x = StateVector::new(0.0, 0.1, 5.0, -1.0, 0.2, 3.0);
        let with_zero_b = predict(&auto, &x, 0.02).unwrap();

        let mut ident = [[0.0; 6]; 6];
        for (i, row) in ident.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        let driven = LinearStateSpaceModel::from_tables(&model::AUTONOMOUS_A, &[[9.0, 9.0]; 6], &ident)
            .unwrap();
        let with_b = predict(&driven, &x, 0.02).unwrap();
        assert_eq!(with_zero_b, with_b);
    }

    #[test]
    fn dynamic_step_matches_state_step() {
        let lqr = model::lqr().unwrap();
        let x = StateVector::new(1.5, -0.3, 20.0, -4.0, 0.4, 7.0);
        let raw = euler_step(&lqr, &x.to_dvector(), 0.02).unwrap();
        let next = predict(&lqr, &x, 0.02).unwrap();
        for i in 0..StateVector::LEN {
            assert_relative_eq!(raw[i], next.0[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn origin_is_an_equilibrium() {
        let lqr = model::lqr().unwrap();
        let zero = StateVector::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(predict(&lqr, &zero, 0.02).unwrap(), zero);
    }

    #[test]
    fn wrong_sized_model_is_an_error() {
        let small = LinearStateSpaceModel::new(4, 2);
        let x = StateVector::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert!(predict(&small, &x, 0.02).is_err());
    }
}
