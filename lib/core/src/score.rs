//! Bounded score helpers.

/// Clamps a score into [0, 1], mapping NaN to 0.
#[must_use]
pub fn unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_clamps() {
        assert_eq!(unit(1.7), 1.0);
        assert_eq!(unit(-0.3), 0.0);
        assert_eq!(unit(0.42), 0.42);
        assert_eq!(unit(f64::NAN), 0.0);
        assert_eq!(unit(f64::INFINITY), 1.0);
    }
}
