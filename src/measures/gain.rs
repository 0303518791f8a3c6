/// Largest `f64` below 1.
const BELOW_ONE: f64 = 1.0 - f64::EPSILON / 2.0;

/// ERR gain, rescaled so the highest observed level stays below 1.
///
/// Evaluated as `2^(n - d) - 2^(-d)` so neither power overflows for large
/// levels; gains that round up to 1 are held just below it.
pub fn err_gain(level: u32, max_rel: u32, min_rel: u32) -> f64 {
    if level < min_rel {
        return 0.0;
    }
    let num_exp = i64::from(level - min_rel) + 1;
    let den_exp = i64::from(max_rel.saturating_sub(1));
    let gain = pow2(num_exp - den_exp) - pow2(-den_exp);
    gain.min(BELOW_ONE)
}

fn pow2(exp: i64) -> f64 {
    let exp = i32::try_from(exp).unwrap_or(if exp < 0 { i32::MIN } else { i32::MAX });
    2.0_f64.powi(exp)
}

/// Q-measure gain: linear in the level above the minimum.
pub fn q_gain(level: u32, min_lvl: u32) -> f64 {
    if level < min_lvl {
        0.0
    } else {
        f64::from(level - min_lvl + 1)
    }
}
