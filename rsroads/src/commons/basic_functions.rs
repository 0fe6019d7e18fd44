/// Squared planar distance between two coordinate pairs
pub fn dist_sq(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    (x1 - x2).powi(2) + (y1 - y2).powi(2)
}

/// Round half away from zero to a fixed number of decimals
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
