use std::fmt;

use nalgebra::{DMatrix, DVector};

use crate::config::Engines;
use crate::error::{LanderError, Result};

// ---------------------------------------------------------------------------
// Linear state-space model:  x' = A x + B u,  y = C x + D u
// ---------------------------------------------------------------------------

/// Linear time-invariant model.
///
/// Two assumptions hold for every instance: the output is fully observable
/// (C defaults to identity) and D has no bearing on the output (0×0).
#[derive(Debug, Clone, PartialEq)]
pub struct LinearStateSpaceModel {
    a: DMatrix<f64>,
    b: DMatrix<f64>,
    c: DMatrix<f64>,
    d: DMatrix<f64>,
}

impl LinearStateSpaceModel {
    /// Empty model: zero A and B, identity C.
    pub fn new(num_states: usize, num_inputs: usize) -> Self {
        Self {
            a: DMatrix::zeros(num_states, num_states),
            b: DMatrix::zeros(num_states, num_inputs),
            c: DMatrix::identity(num_states, num_states),
            d: DMatrix::zeros(0, 0),
        }
    }

    /// Build from row-major coefficient tables.
    ///
    /// Fails on ragged tables, a non-square A, or B / C that do not match
    /// A's state count.
    pub fn from_tables<RA, RB, RC>(a: &[RA], b: &[RB], c: &[RC]) -> Result<Self>
    where
        RA: AsRef<[f64]>,
        RB: AsRef<[f64]>,
        RC: AsRef<[f64]>,
    {
        let a = table("A", a)?;
        let b = table("B", b)?;
        let c = table("C", c)?;

        let n = a.nrows();
        if a.ncols() != n {
            return Err(LanderError::dimension_mismatch(
                "A",
                format!("{n}x{n}"),
                shape(&a),
            ));
        }
        if b.nrows() != n {
            return Err(LanderError::dimension_mismatch(
                "B",
                format!("{n}xm"),
                shape(&b),
            ));
        }
        if c.ncols() != n {
            return Err(LanderError::dimension_mismatch(
                "C",
                format!("px{n}"),
                shape(&c),
            ));
        }

        Ok(Self { a, b, c, d: DMatrix::zeros(0, 0) })
    }

    pub fn a(&self) -> &DMatrix<f64> { &self.a }
    pub fn b(&self) -> &DMatrix<f64> { &self.b }
    pub fn c(&self) -> &DMatrix<f64> { &self.c }
    pub fn d(&self) -> &DMatrix<f64> { &self.d }

    pub fn num_states(&self) -> usize {
        self.a.nrows()
    }

    pub fn num_inputs(&self) -> usize {
        self.b.ncols()
    }

    /// Autonomous rate of change, A·x.
    pub fn derivative(&self, x: &DVector<f64>) -> Result<DVector<f64>> {
        if x.len() != self.num_states() {
            return Err(LanderError::dimension_mismatch(
                "state vector",
                self.num_states().to_string(),
                x.len().to_string(),
            ));
        }
        Ok(&self.a * x)
    }
}

impl Default for LinearStateSpaceModel {
    fn default() -> Self {
        Self::new(6, 2)
    }
}

impl fmt::Display for LinearStateSpaceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Linear State Space Model:")?;
        write!(f, "A:{}", self.a)?;
        write!(f, "B:{}", self.b)?;
        write!(f, "C:{}", self.c)?;
        write!(f, "D: {}x{} (empty)", self.d.nrows(), self.d.ncols())
    }
}

fn table<R: AsRef<[f64]>>(what: &'static str, rows: &[R]) -> Result<DMatrix<f64>> {
    let ncols = rows.first().map_or(0, |r| r.as_ref().len());
    let mut flat = Vec::with_capacity(rows.len() * ncols);
    for (i, row) in rows.iter().enumerate() {
        let row = row.as_ref();
        if row.len() != ncols {
            return Err(LanderError::dimension_mismatch(
                what,
                format!("{ncols} columns in every row"),
                format!("{} columns in row {i}", row.len()),
            ));
        }
        flat.extend_from_slice(row);
    }
    Ok(DMatrix::from_row_slice(rows.len(), ncols, &flat))
}

fn shape(m: &DMatrix<f64>) -> String {
    format!("{}x{}", m.nrows(), m.ncols())
}

// ---------------------------------------------------------------------------
// Model presets
// ---------------------------------------------------------------------------

const IDENTITY_C: [[f64; 6]; 6] = [
    [1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
    [0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
];

const ZERO_B: [[f64; 2]; 6] = [[0.0; 2]; 6];

/// Hand-tuned open-loop model driving the observer correction.
pub const AUTONOMOUS_A: [[f64; 6]; 6] = [
    [0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
    [-0.0032, -0.3278, 0.0, 0.0, 639.7634, -35.8847],
    [0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, -1000.0, -110.0, 0.0, 0.0],
    [0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
    [-0.01, -1.0111, 0.0, 0.0, -1111.0, -110.6822],
];

/// Closed-loop LQR model, stored scaled down by 10.
pub const LQR_A: [[f64; 6]; 6] = [
    [0.0, 0.1, 0.0, 0.0, 0.0, 0.0],
    [-0.32, -3.18, 0.0, 0.0, -50.14, -3.53],
    [0.0, 0.0, 0.0, 0.1, 0.0, 0.0],
    [0.0, -0.01, -0.32, -0.4, -2.95, 0.0],
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.1],
    [-0.98, -9.8, 0.0, 0.0, -463.08, -10.89],
];

/// Linearization of the rocket about upright hover.
///
/// Thrust enters through theta: the main engine couples into vx and the
/// stabilizers into vy.
pub fn linearized_plant(engines: &Engines, mass: f64, inertia: f64) -> Result<LinearStateSpaceModel> {
    let main = engines.main_thrust_multiplier / mass;
    let stab = -engines.stabilizer_thrust_multiplier / mass;
    let a = [
        [0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 0.0, main, 0.0],
        [0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 0.0, stab, 0.0],
        [0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
        [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    ];
    let b = [
        [0.0, 0.0],
        [0.0, 1.0 / mass],
        [0.0, 0.0],
        [1.0 / mass, 0.0],
        [0.0, 0.0],
        [0.0, 1.0 / inertia],
    ];
    LinearStateSpaceModel::from_tables(&a, &b, &IDENTITY_C)
}

pub fn autonomous() -> Result<LinearStateSpaceModel> {
    LinearStateSpaceModel::from_tables(&AUTONOMOUS_A, &ZERO_B, &IDENTITY_C)
}

pub fn lqr() -> Result<LinearStateSpaceModel> {
    LinearStateSpaceModel::from_tables(&LQR_A, &ZERO_B, &IDENTITY_C)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_shape() {
        let m = LinearStateSpaceModel::default();
        assert_eq!(m.num_states(), 6);
        assert_eq!(m.num_inputs(), 2);
        assert_eq!(m.c(), &DMatrix::identity(6, 6));
        assert_eq!(m.d().len(), 0);
        assert!(m.a().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn presets_have_literal_coefficients() {
        let auto = autonomous().unwrap();
        assert_eq!(auto.a()[(1, 4)], 639.7634);
        assert_eq!(auto.a()[(5, 5)], -110.6822);
        assert!(auto.b().iter().all(|&v| v == 0.0));

        let lqr = lqr().unwrap();
        assert_eq!(lqr.a()[(5, 4)], -463.08);
        assert_eq!(lqr.a()[(3, 2)], -0.32);
        assert_eq!(lqr.num_inputs(), 2);
    }

    #[test]
    fn plant_depends_on_mass_and_inertia() {
        let engines = Engines::default();
        let plant = linearized_plant(&engines, 4.0, 0.5).unwrap();
        assert_eq!(plant.a()[(1, 4)], 25.0);
        assert_eq!(plant.a()[(3, 4)], -0.5);
        assert_eq!(plant.b()[(3, 0)], 0.25);
        assert_eq!(plant.b()[(5, 1)], 2.0);
    }

    #[test]
    fn ragged_table_rejected() {
        let a: [&[f64]; 2] = [&[0.0, 1.0], &[0.0]];
        let b = [[0.0], [0.0]];
        let c = [[1.0, 0.0], [0.0, 1.0]];
        let err = LinearStateSpaceModel::from_tables(&a, &b, &c).unwrap_err();
        assert!(matches!(err, LanderError::DimensionMismatch { what: "A", .. }));
    }

    #[test]
    fn mismatched_input_matrix_rejected() {
        let a = [[0.0, 1.0], [0.0, 0.0]];
        let b = [[0.0], [0.0], [1.0]];
        let c = [[1.0, 0.0], [0.0, 1.0]];
        let err = LinearStateSpaceModel::from_tables(&a, &b, &c).unwrap_err();
        assert!(matches!(err, LanderError::DimensionMismatch { what: "B", .. }));
    }

    #[test]
    fn derivative_checks_state_length() {
        let m = lqr().unwrap();
        assert!(m.derivative(&DVector::zeros(5)).is_err());
        let dx = m.derivative(&DVector::zeros(6)).unwrap();
        assert!(dx.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn display_lists_all_matrices() {
        let text = autonomous().unwrap().to_string();
        for label in ["A:", "B:", "C:", "D:"] {
            assert!(text.contains(label), "missing {label}");
        }
    }
}
