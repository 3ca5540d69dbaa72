//! CIE standard illuminant white points
//!
//! Specified as XYZ with Y normalized to 1.0.

use crate::color::Xyz;
use crate::structs::Illuminant;

/// A white point definition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhitePoint {
    /// Name of the illuminant
    pub name: &'static str,
    /// CIE XYZ coordinates (Y normalized to 1.0)
    pub xyz: Xyz,
}

impl WhitePoint {
    pub const fn new(name: &'static str, x: f64, y: f64, z: f64) -> Self {
        Self {
            name,
            xyz: Xyz::new(x, y, z),
        }
    }

    /// Chromaticity coordinates (x, y)
    pub fn chromaticity(&self) -> (f64, f64) {
        let (x, y, _) = self.xyz.to_xyy();
        (x, y)
    }
}

/// CIE D50, the ICC profile connection space illuminant
pub const D50: WhitePoint = WhitePoint::new("D50", 0.9642, 1.0, 0.8249);

/// CIE D65, noon daylight
pub const D65: WhitePoint = WhitePoint::new("D65", 0.9505, 1.0, 1.0890);

impl Illuminant {
    /// White point of this illuminant
    pub fn white_point(&self) -> WhitePoint {
        match self {
            Illuminant::D50 => D50,
            Illuminant::D65 => D65,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_d50_values() {
        assert!((D50.xyz.x - 0.9642).abs() < 0.001);
        assert!((D50.xyz.y - 1.0).abs() < 0.001);
        assert!((D50.xyz.z - 0.8249).abs() < 0.001);
    }

    #[test]
    fn test_d65_chromaticity() {
        let (x, y) = Illuminant::D65.white_point().chromaticity();
        assert!((x - 0.3127).abs() < 0.001);
        assert!((y - 0.3290).abs() < 0.001);
    }

    #[test]
    fn test_illuminant_lookup() {
        assert_eq!(Illuminant::D50.white_point(), D50);
        assert_eq!(Illuminant::default().white_point().name, "D50");
    }
}
