use std::fmt;
use serde::{Deserialize, Serialize};
use crate::grid::Layout;




#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]


/**
 * Integral measures of a solution, used to watch conservation and
 * positivity over a run. Sums are accumulated in double precision and
 * scaled by the cell area.
 */
pub struct Diagnostics {
    /// Domain integral of every field.
    pub totals: Vec<f64>,
    /// Smallest value of the leading field.
    pub min: f32,
    /// Largest value of the leading field.
    pub max: f32,
}




// ============================================================================
impl Diagnostics {

    /// Measure the interior of a padded state buffer.
    pub fn measure(u: &[f32], layout: &Layout, cell_area: f64) -> Self {
        let mut totals = vec![0.0; layout.nfield()];
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;

        for (k, total) in totals.iter_mut().enumerate() {
            let mut sum = 0.0;

            for iy in 0..layout.ny() {
                let start = layout.offset(k, 0, iy as i64);

                for &value in &u[start..start + layout.nx()] {
                    sum += value as f64;

                    if k == 0 {
                        min = min.min(value);
                        max = max.max(value);
                    }
                }
            }
            *total = sum * cell_area;
        }
        Self { totals, min, max }
    }

    /// Integral of the leading field (water volume, for shallow water).
    pub fn volume(&self) -> f64 {
        self.totals.first().copied().unwrap_or(0.0)
    }

    /// Integrals of the second and third fields, if present.
    pub fn momentum(&self) -> (f64, f64) {
        let get = |k: usize| self.totals.get(k).copied().unwrap_or(0.0);
        (get(1), get(2))
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (px, py) = self.momentum();
        write!(
            fmt,
            "volume {:.6e}, momentum ({:.6e}, {:.6e}), range [{:.6e}, {:.6e}]",
            self.volume(), px, py, self.min, self.max)
    }
}
