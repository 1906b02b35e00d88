/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use rand::{rngs::StdRng, Rng, SeedableRng};

/// A source of small random perturbations, used to break ties between equally-scored moves.
///
/// Every consumer of randomness receives one of these explicitly,
/// so a search can be made reproducible with [`Noise::seeded`] or fully deterministic with [`Noise::silent`].
#[derive(Clone)]
pub struct Noise(Option<StdRng>);

impl Noise {
    /// Noise drawn from a generator seeded with `seed`, reproducible between runs.
    ///
    /// # Example
    /// ```
    /// # use newt::Noise;
    /// let mut a = Noise::seeded(7);
    /// let mut b = Noise::seeded(7);
    /// assert_eq!(a.sample(1.0), b.sample(1.0));
    /// ```
    #[inline(always)]
    pub fn seeded(seed: u64) -> Self {
        Self(Some(StdRng::seed_from_u64(seed)))
    }

    /// Noise drawn from a generator seeded by the operating system.
    #[inline(always)]
    pub fn from_entropy() -> Self {
        Self(Some(StdRng::from_entropy()))
    }

    /// Noise that always yields `0.0`.
    #[inline(always)]
    pub const fn silent() -> Self {
        Self(None)
    }

    #[inline(always)]
    pub const fn is_silent(&self) -> bool {
        self.0.is_none()
    }

    /// A uniform sample from `[0, scale)`, or `0.0` if this noise is silent or `scale` is not positive.
    ///
    /// # Example
    /// ```
    /// # use newt::Noise;
    /// let mut noise = Noise::seeded(42);
    /// let x = noise.sample(0.01);
    /// assert!((0.0..0.01).contains(&x));
    ///
    /// assert_eq!(Noise::silent().sample(0.01), 0.0);
    /// ```
    #[inline(always)]
    pub fn sample(&mut self, scale: f64) -> f64 {
        match &mut self.0 {
            Some(rng) if scale > 0.0 => rng.gen::<f64>() * scale,
            _ => 0.0,
        }
    }
}

impl Default for Noise {
    #[inline(always)]
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl fmt::Debug for Noise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_silent() {
            write!(f, "Noise(silent)")
        } else {
            write!(f, "Noise(random)")
        }
    }
}
