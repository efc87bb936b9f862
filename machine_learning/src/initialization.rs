use rand::{
    Rng, SeedableRng,
    distr::{Distribution, Uniform},
    rngs::StdRng,
};

use crate::{MlErr, Result};

/// Builds the random number generator used for parameter initialization.
///
/// # Arguments
/// * `seed` - A fixed seed for reproducible runs, or `None` to draw from the OS.
pub fn generate_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Fills `params` with samples from `U(-bound, bound)`.
///
/// # Arguments
/// * `rng` - A random number generator.
/// * `bound` - The half width of the distribution.
/// * `params` - The slice to overwrite.
///
/// # Returns
/// An error if `bound` doesn't describe a valid range.
pub fn uniform_fill<R: Rng>(rng: &mut R, bound: f32, params: &mut [f32]) -> Result<()> {
    let dist = Uniform::new(-bound, bound).map_err(|_| MlErr::InvalidInitRange {
        low: -bound,
        high: bound,
    })?;

    for p in params.iter_mut() {
        *p = dist.sample(rng);
    }

    Ok(())
}

/// The default initialization bound of a dense layer, `1 / sqrt(fan_in)`.
pub fn fan_in_bound(fan_in: usize) -> f32 {
    1.0 / (fan_in.max(1) as f32).sqrt()
}
