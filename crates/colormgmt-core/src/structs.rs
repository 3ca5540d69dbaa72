//! Shared color management vocabulary
//!
//! Enumerations and small value types used by every other module. The only
//! behaviour here is field-wise equality on [`ColorTransformInfo`] and the
//! accessors on [`ColorMgmtStrategy`].

use crate::format::ColorFormat;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Color model family of a pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorType {
    #[default]
    Unknown,
    Rgb,
    Cmyk,
    Gray,
    Lab,
}

/// Color space declared by an ICC profile header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum ColorSpaceType {
    #[default]
    Unknown,
    Xyz,
    Lab,
    Luv,
    YCbCr,
    Yxy,
    Rgb,
    Gray,
    Hsv,
    Hls,
    Cmyk,
    Cmy,
}

impl ColorSpaceType {
    /// Whether pixel data of family `color_type` can be read through this space
    pub fn accepts(&self, color_type: ColorType) -> bool {
        match color_type {
            ColorType::Rgb => matches!(self, Self::Rgb),
            ColorType::Cmyk => matches!(self, Self::Cmyk | Self::Cmy),
            ColorType::Gray => matches!(self, Self::Gray),
            ColorType::Lab => matches!(self, Self::Lab),
            ColorType::Unknown => false,
        }
    }
}

impl From<moxcms::DataColorSpace> for ColorSpaceType {
    fn from(cs: moxcms::DataColorSpace) -> Self {
        match cs {
            moxcms::DataColorSpace::Rgb => Self::Rgb,
            moxcms::DataColorSpace::Cmyk => Self::Cmyk,
            moxcms::DataColorSpace::Gray => Self::Gray,
            moxcms::DataColorSpace::Lab => Self::Lab,
            moxcms::DataColorSpace::Xyz => Self::Xyz,
            moxcms::DataColorSpace::YCbr => Self::YCbCr,
            moxcms::DataColorSpace::Luv => Self::Luv,
            moxcms::DataColorSpace::Hsv => Self::Hsv,
            moxcms::DataColorSpace::Hls => Self::Hls,
            moxcms::DataColorSpace::Cmy => Self::Cmy,
            _ => Self::Unknown,
        }
    }
}

/// ICC profile device class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum ProfileClass {
    #[default]
    Unknown,
    Input,
    Display,
    Output,
    Link,
    Abstract,
    ColorSpace,
    NamedColor,
}

impl From<moxcms::ProfileClass> for ProfileClass {
    fn from(pc: moxcms::ProfileClass) -> Self {
        match pc {
            moxcms::ProfileClass::InputDevice => Self::Input,
            moxcms::ProfileClass::DisplayDevice => Self::Display,
            moxcms::ProfileClass::OutputDevice => Self::Output,
            moxcms::ProfileClass::DeviceLink => Self::Link,
            moxcms::ProfileClass::ColorSpace => Self::ColorSpace,
            moxcms::ProfileClass::Abstract => Self::Abstract,
            moxcms::ProfileClass::Named => Self::NamedColor,
        }
    }
}

/// Rendering intent for color transformations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RenderIntent {
    /// Perceptual - compress gamut to fit, preserve relationships
    #[default]
    Perceptual = 0,
    /// Relative colorimetric - map white point, clip out-of-gamut
    RelativeColorimetric = 1,
    /// Saturation - preserve saturation over accuracy
    Saturation = 2,
    /// Absolute colorimetric - no white point mapping
    AbsoluteColorimetric = 3,
}

impl From<RenderIntent> for moxcms::RenderingIntent {
    fn from(ri: RenderIntent) -> Self {
        match ri {
            RenderIntent::Perceptual => Self::Perceptual,
            RenderIntent::RelativeColorimetric => Self::RelativeColorimetric,
            RenderIntent::Saturation => Self::Saturation,
            RenderIntent::AbsoluteColorimetric => Self::AbsoluteColorimetric,
        }
    }
}

bitflags! {
    /// Behaviour switches that take part in a transform's identity
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ColorTransformFlags: u32 {
        const BLACK_POINT_COMPENSATION = 1;
        const BLACK_PRESERVATION = 2;
        const SOFTPROOFING = 4;
        const GAMUT_CHECK = 8;
    }
}

impl ColorTransformFlags {
    /// Flags that only make sense together with a proofing profile
    pub const PROOFING: Self = Self::SOFTPROOFING.union(Self::GAMUT_CHECK);
}

/// Standard illuminants used for Lab profiles and conversions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Illuminant {
    #[default]
    D50,
    D65,
}

/// Standard colorimetric observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Observer {
    #[default]
    Deg2,
    Deg10,
}

/// Engine-wide policy switches
///
/// Combined with a profile pair and an intent this fixes a transform's
/// behaviour. The two switches are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorMgmtStrategy {
    use_black_point_compensation: bool,
    use_black_preservation: bool,
}

impl Default for ColorMgmtStrategy {
    fn default() -> Self {
        Self {
            use_black_point_compensation: true,
            use_black_preservation: false,
        }
    }
}

impl ColorMgmtStrategy {
    pub fn use_black_point_compensation(&self) -> bool {
        self.use_black_point_compensation
    }

    pub fn set_use_black_point_compensation(&mut self, enabled: bool) {
        self.use_black_point_compensation = enabled;
    }

    pub fn use_black_preservation(&self) -> bool {
        self.use_black_preservation
    }

    pub fn set_use_black_preservation(&mut self, enabled: bool) {
        self.use_black_preservation = enabled;
    }

    /// Transform flags implied by this policy
    pub fn transform_flags(&self) -> ColorTransformFlags {
        let mut flags = ColorTransformFlags::empty();
        flags.set(
            ColorTransformFlags::BLACK_POINT_COMPENSATION,
            self.use_black_point_compensation,
        );
        flags.set(
            ColorTransformFlags::BLACK_PRESERVATION,
            self.use_black_preservation,
        );
        flags
    }
}

/// Summary of a profile found while scanning a directory
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColorProfileInfo {
    pub file: String,
    pub description: String,
    pub color_space: ColorSpaceType,
    pub device_class: ProfileClass,
    /// Load error for files that could not be opened
    pub debug: String,
}

/// Parameters that fully define a color transform
///
/// Serves both as the transform's self-description and as the pool's cache
/// key. Equality is strict and field-wise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ColorTransformInfo {
    /// Identifier (data hash) of the input profile
    pub input_profile: String,
    /// Identifier (data hash) of the output profile
    pub output_profile: String,
    /// Identifier of the proofing profile, if the transform simulates one
    pub proofing_profile: Option<String>,
    pub input_format: ColorFormat,
    pub output_format: ColorFormat,
    pub render_intent: RenderIntent,
    pub proofing_intent: RenderIntent,
    pub flags: ColorTransformFlags,
}

impl ColorTransformInfo {
    /// Whether this describes a proofing transform
    pub fn is_proofing(&self) -> bool {
        self.proofing_profile.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_info() -> ColorTransformInfo {
        ColorTransformInfo {
            input_profile: "profile-a".into(),
            output_profile: "profile-b".into(),
            proofing_profile: None,
            input_format: ColorFormat::Rgb8,
            output_format: ColorFormat::Cmyk8,
            render_intent: RenderIntent::Perceptual,
            proofing_intent: RenderIntent::Perceptual,
            flags: ColorTransformFlags::BLACK_POINT_COMPENSATION,
        }
    }

    fn variants() -> Vec<ColorTransformInfo> {
        let base = base_info();
        vec![
            base.clone(),
            ColorTransformInfo {
                flags: ColorTransformFlags::empty(),
                ..base.clone()
            },
            ColorTransformInfo {
                proofing_profile: Some("profile-c".into()),
                ..base.clone()
            },
            ColorTransformInfo {
                output_format: ColorFormat::Cmyk16,
                ..base.clone()
            },
            ColorTransformInfo {
                render_intent: RenderIntent::RelativeColorimetric,
                ..base.clone()
            },
            ColorTransformInfo {
                proofing_intent: RenderIntent::AbsoluteColorimetric,
                ..base
            },
        ]
    }

    #[test]
    fn test_info_flags_break_equality() {
        let with_bpc = base_info();
        let without_bpc = ColorTransformInfo {
            flags: ColorTransformFlags::empty(),
            ..base_info()
        };
        assert_ne!(with_bpc, without_bpc);
        assert_eq!(with_bpc, base_info());
    }

    #[test]
    fn test_info_equality_is_an_equivalence() {
        let set = variants();
        let copies = variants();

        for (i, a) in set.iter().enumerate() {
            assert_eq!(a, a);
            for (j, b) in set.iter().enumerate() {
                assert_eq!(a == b, i == j, "variants {i} and {j}");
                assert_eq!(a == b, b == a);
            }
            // a == copy, copy == a' implies a == a'
            assert_eq!(a, &copies[i]);
            assert_eq!(&copies[i], &set[i]);
        }
    }

    #[test]
    fn test_strategy_defaults_and_flags() {
        let mut strategy = ColorMgmtStrategy::default();
        assert!(strategy.use_black_point_compensation());
        assert!(!strategy.use_black_preservation());
        assert_eq!(
            strategy.transform_flags(),
            ColorTransformFlags::BLACK_POINT_COMPENSATION
        );

        strategy.set_use_black_point_compensation(false);
        strategy.set_use_black_preservation(true);
        assert!(!strategy.use_black_point_compensation());
        assert!(strategy.use_black_preservation());
        assert_eq!(
            strategy.transform_flags(),
            ColorTransformFlags::BLACK_PRESERVATION
        );
    }

    #[test]
    fn test_color_space_accepts_family() {
        assert!(ColorSpaceType::Rgb.accepts(ColorType::Rgb));
        assert!(ColorSpaceType::Cmy.accepts(ColorType::Cmyk));
        assert!(!ColorSpaceType::Cmyk.accepts(ColorType::Rgb));
        assert!(!ColorSpaceType::Unknown.accepts(ColorType::Unknown));
    }
}
