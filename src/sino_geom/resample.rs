//! Coarser and finer versions of an existing geometry.

use super::{Sampling, SinoGeom};
use crate::{Error, Result};

impl SinoGeom {

    /// Geometry with `factor` times fewer radial samples and angles.
    ///
    /// `nb` becomes `2 max(nb / 2factor, 1)` (always even) and `na` becomes
    /// `max(na / factor, 1)`. The radial spacing and strip width grow by
    /// `factor`; everything else is unchanged.
    pub fn down(&self, factor: usize) -> Result<Self> {
        check_factor(factor)?;
        let f = factor as f32;
        Ok(self.with_sampling(|s| Sampling {
            nb         : 2 * (s.nb / 2 / factor).max(1),
            na         : (s.na / factor).max(1),
            d          : s.d * f,
            strip_width: s.strip_width * f,
            ..*s
        }))
    }

    /// Geometry with `factor` times more radial samples, at `1/factor` of the
    /// spacing. Angles, offset and fan parameters are unchanged.
    pub fn oversample(&self, factor: usize) -> Result<Self> {
        check_factor(factor)?;
        let nb = self.nb().checked_mul(factor)
            .ok_or_else(|| Error::invalid("factor", format!("{factor} × {} radial samples overflows", self.nb())))?;
        let f = factor as f32;
        Ok(self.with_sampling(|s| Sampling {
            nb,
            d          : s.d / f,
            strip_width: s.strip_width / f,
            ..*s
        }))
    }

    fn with_sampling(&self, change: impl FnOnce(&Sampling) -> Sampling) -> Self {
        match self {
            Self::Par    (s)      => Self::Par    (change(s)),
            Self::Moj    (s)      => Self::Moj    (change(s)),
            Self::FanArc (s, fan) => Self::FanArc (change(s), *fan),
            Self::FanFlat(s, fan) => Self::FanFlat(change(s), *fan),
        }
    }
}

fn check_factor(factor: usize) -> Result<()> {
    if factor == 0 { return Err(Error::invalid("factor", "must be at least 1")) }
    Ok(())
}
