use crate::error::DecayError;

/// An implementation of a time-decaying value
pub trait Decay {
    /// Calculate value at time `t`
    fn evaluate(&self, t: f64) -> f64;
}

/// v(t) = max(v<sub>i</sub> * r<sup>t</sup>, v<sub>f</sub>)
///
/// The discrete form of "multiply by `r` once per episode, never drop below `vf`".
/// `t` is truncated to a whole number of decay steps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Multiplicative {
    rate: f64,
    vi: f64,
    vf: f64,
}

impl Multiplicative {
    /// **Errors** if `rate` is not in `[0, 1]` or `vi < vf`
    pub fn new(rate: f64, vi: f64, vf: f64) -> Result<Self, DecayError> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(DecayError::Factor(rate));
        }
        if vi < vf {
            return Err(DecayError::Direction { vi, vf });
        }
        Ok(Self { rate, vi, vf })
    }

    /// The floor this schedule converges to
    pub fn floor(&self) -> f64 {
        self.vf
    }
}

impl Decay for Multiplicative {
    fn evaluate(&self, t: f64) -> f64 {
        let &Self { rate, vi, vf } = self;
        (vi * rate.powf(t.floor())).max(vf)
    }
}
