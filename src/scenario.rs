use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};




#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]


/**
 * Named shallow-water initial conditions. Each is a function of the cell
 * centre and the physical domain size, and writes `(h, hu, hv)`.
 */
pub enum Scenario {
    /// A circular column of water, height 1.5 over a depth of 1, in the
    /// middle of the domain.
    DamBreak,
    /// Still water of depth 1.
    Pond,
    /// Depth 1 flowing uniformly along x.
    River,
    /// A sinusoidal height perturbation along x.
    Wave,
    /// A Gaussian hump on a depth of 1.
    Bump,
}




// ============================================================================
impl Scenario {

    pub const ALL: [Scenario; 5] = [
        Scenario::DamBreak,
        Scenario::Pond,
        Scenario::River,
        Scenario::Wave,
        Scenario::Bump,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::DamBreak => "dam_break",
            Scenario::Pond => "pond",
            Scenario::River => "river",
            Scenario::Wave => "wave",
            Scenario::Bump => "bump",
        }
    }

    /// Write the state at `(x, y)` of a `width x height` domain into `u`.
    pub fn apply(&self, (width, height): (f32, f32), (x, y): (f32, f32), u: &mut [f32]) {
        let (cx, cy) = (0.5 * width, 0.5 * height);
        let r2 = (x - cx).powi(2) + (y - cy).powi(2);

        match self {
            Scenario::DamBreak => {
                let radius = 0.25 * width.min(height);
                u[0] = if r2 < radius * radius { 1.5 } else { 1.0 };
            }
            Scenario::Pond => {
                u[0] = 1.0;
            }
            Scenario::River => {
                u[0] = 1.0;
                u[1] = 1.0;
            }
            Scenario::Wave => {
                u[0] = 1.0 + 0.2 * (2.0 * PI * x / width).sin();
            }
            Scenario::Bump => {
                let sigma = 0.1 * width.min(height);
                u[0] = 1.0 + 0.5 * (-r2 / (2.0 * sigma * sigma)).exp();
            }
        }
    }

    /// An initial-condition callback for a domain of the given size.
    pub fn initial_condition(self, size: (f32, f32)) -> impl FnMut((f32, f32), &mut [f32]) {
        move |centre, u| self.apply(size, centre, u)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}", self.name())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|scenario| scenario.name() == s.replace('-', "_"))
            .copied()
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(Scenario::name).collect();
                format!("unknown scenario '{}' (expected one of {})", s, names.join(", "))
            })
    }
}
