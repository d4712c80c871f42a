/// Mass of a proton in daltons.
pub const PROTON_MASS: f64 = 1.007276;

/// Mass differences within this many daltons of zero are treated as
/// unmodified observations.
pub const UNMODIFIED_MASS_DIFF_THRESHOLD: f64 = 0.99;

/// Rounds half away from zero to the requested number of decimals.
pub fn round_decimals(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Mass over charge of a neutral mass carrying `charge` protons.
///
/// Returns `None` for a charge of zero, which upstream tools sometimes emit
/// and would otherwise divide by zero.
pub fn neutral_mass_to_mz(neutral_mass: f64, charge: u8) -> Option<f64> {
    if charge == 0 {
        return None;
    }
    let z = charge as f64;
    Some(round_decimals((neutral_mass + z * PROTON_MASS) / z, 4))
}

pub fn is_unmodified_mass_diff(mass_diff: f64) -> bool {
    (-UNMODIFIED_MASS_DIFF_THRESHOLD..=UNMODIFIED_MASS_DIFF_THRESHOLD).contains(&mass_diff)
}
