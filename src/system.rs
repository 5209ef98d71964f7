use crate::error::OlivineError;
use nalgebra::{DMatrix, DVector};

/// Default relative pivot tolerance for the elimination.
pub const PIVOT_TOLERANCE: f64 = 1e-12;

/// The dense linear system `A u = B` of one elasticity problem,
/// `N = 2 * n_nodes`. Zero-initialized at creation, filled by the assembler,
/// folded by the constraint step and consumed by the elimination.
#[derive(Debug)]
pub struct LinearSystem {
    pub a: DMatrix<f64>,
    pub b: DVector<f64>,
    /// Pivots smaller than `pivot_tolerance * max|A|` abort the elimination.
    pub pivot_tolerance: f64,
}

impl LinearSystem {
    pub fn new(size: usize) -> LinearSystem {
        LinearSystem {
            a: DMatrix::zeros(size, size),
            b: DVector::zeros(size),
            pivot_tolerance: PIVOT_TOLERANCE,
        }
    }

    pub fn size(&self) -> usize {
        self.b.nrows()
    }

    /// Folds the Dirichlet constraint `u[dof] = value` into the system.
    ///
    /// Moves the known column to the right-hand side, zeroes row and column
    /// `dof` and pins the diagonal, so symmetry is preserved and the solve
    /// returns exactly `value` at this degree of freedom.
    pub fn constrain(&mut self, dof: usize, value: f64) {
        let size = self.size();

        for j in 0..size {
            self.b[j] -= self.a[(j, dof)] * value;
            self.a[(j, dof)] = 0.0;
        }
        for j in 0..size {
            self.a[(dof, j)] = 0.0;
        }

        self.a[(dof, dof)] = 1.0;
        self.b[dof] = value;
    }

    /// Solves the system by Gaussian elimination with partial pivoting,
    /// consuming it.
    ///
    /// # Returns
    /// The solution vector, ordered `(x0, y0, x1, y1, ...)`
    pub fn eliminate(mut self) -> Result<DVector<f64>, OlivineError> {
        let size = self.size();
        let threshold = self.pivot_tolerance * self.a.amax();

        // Forward elimination
        for k in 0..size {
            let mut pivot_row = k;
            for i in k + 1..size {
                if self.a[(i, k)].abs() > self.a[(pivot_row, k)].abs() {
                    pivot_row = i;
                }
            }
            if self.a[(pivot_row, k)].abs() <= threshold {
                return Err(OlivineError::Numeric(format!(
                    "No usable pivot for unknown {}: the system is singular \
                     (missing constraints leave a rigid body mode?)",
                    k
                )));
            }
            if pivot_row != k {
                self.a.swap_rows(k, pivot_row);
                self.b.swap_rows(k, pivot_row);
            }

            for i in k + 1..size {
                let ratio = self.a[(i, k)] / self.a[(k, k)];
                if ratio == 0.0 {
                    continue;
                }
                for j in k..size {
                    let contribution = ratio * self.a[(k, j)];
                    self.a[(i, j)] -= contribution;
                }
                self.b[i] -= ratio * self.b[k];
            }
        }

        // Back-substitution
        let mut solution = DVector::zeros(size);
        for i in (0..size).rev() {
            let mut value = self.b[i];
            for j in i + 1..size {
                value -= self.a[(i, j)] * solution[j];
            }
            solution[i] = value / self.a[(i, i)];
        }

        Ok(solution)
    }
}
