//! # constants.rs
//!
//! Mathematical constants recognised by name in formulas.
//!
//! The parser keeps constants as plain variables; this table lets the type
//! analyzer and the simplifier know that `pi` or `e` is a real number.

use phf::Map;
use phf_macros::phf_map;

/// Map of mathematical constants by their name in formulas.
static CONSTANTS: Map<&'static str, f64> = phf_map! {
    "pi" => std::f64::consts::PI,
    "π" => std::f64::consts::PI,
    "e" => std::f64::consts::E,
    "tau" => std::f64::consts::TAU,
    "τ" => std::f64::consts::TAU,
    "phi" => 1.618_033_988_749_895,
    "φ" => 1.618_033_988_749_895,
};

/// Name of Euler's number.
pub const EULER: &str = "e";

/// Returns the value of a constant by name.
pub fn get(name: &str) -> Option<f64> {
    CONSTANTS.get(name).copied()
}

/// Returns `true` if `name` is a known constant.
pub fn contains(name: &str) -> bool {
    CONSTANTS.contains_key(name)
}

/// Returns a list of supported constant names.
pub fn names() -> Vec<&'static str> {
    CONSTANTS.keys().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_get() {
        assert_abs_diff_eq!(get("pi").unwrap(), std::f64::consts::PI);
        assert_abs_diff_eq!(get("π").unwrap(), std::f64::consts::PI);
        assert_abs_diff_eq!(get(EULER).unwrap(), std::f64::consts::E);
        assert_eq!(get("PI"), None);
        assert_eq!(get("x"), None);
    }

    #[test]
    fn test_names() {
        let names = names();
        assert!(names.contains(&"tau"));
        assert!(contains("phi"));
        assert!(!contains("i"));
    }
}
