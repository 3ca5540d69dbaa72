//! Pixel format descriptors
//!
//! Static metadata about the packed pixel encodings understood by the
//! transform engines. Every query is total: `ColorFormat::Undefined` (and any
//! raw value that does not name a format) answers "unknown / zero" instead of
//! failing, since these lookups sit on per-pixel paths.
//!
//! When adding a format, extend every match below together; the tests walk
//! [`ColorFormat::ALL`] to catch a missed arm.

use crate::structs::ColorType;
use serde::{Deserialize, Serialize};

/// Concrete packed pixel encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorFormat {
    /// No format; sentinel for uninitialised requests
    #[default]
    Undefined,
    Rgb8,
    Rgb16,
    Rgba8,
    Rgba16,
    Argb8,
    Argb16,
    Bgra8,
    Bgra16,
    Cmyk8,
    Cmyk16,
    Cmyka8,
    Cmyka16,
    /// CMYK with cyan and yellow swapped, as written by some legacy codecs
    Ymck8,
    Ymck16,
    Gray8,
    Gray16,
    /// 8-bit Lab with trailing alpha
    LabA8,
    /// Lab as three native `f64` values (L in 0..100, a and b unbounded)
    LabDbl,
}

impl ColorFormat {
    /// Every format, in declaration order
    pub const ALL: [ColorFormat; 19] = [
        ColorFormat::Undefined,
        ColorFormat::Rgb8,
        ColorFormat::Rgb16,
        ColorFormat::Rgba8,
        ColorFormat::Rgba16,
        ColorFormat::Argb8,
        ColorFormat::Argb16,
        ColorFormat::Bgra8,
        ColorFormat::Bgra16,
        ColorFormat::Cmyk8,
        ColorFormat::Cmyk16,
        ColorFormat::Cmyka8,
        ColorFormat::Cmyka16,
        ColorFormat::Ymck8,
        ColorFormat::Ymck16,
        ColorFormat::Gray8,
        ColorFormat::Gray16,
        ColorFormat::LabA8,
        ColorFormat::LabDbl,
    ];

    /// Map a raw discriminant to a format; out-of-range values become `Undefined`
    pub fn from_raw(raw: u32) -> Self {
        Self::ALL
            .get(raw as usize)
            .copied()
            .unwrap_or(ColorFormat::Undefined)
    }

    /// Color model family of this encoding
    pub const fn color_type(self) -> ColorType {
        match self {
            Self::Undefined => ColorType::Unknown,
            Self::Rgb8
            | Self::Rgb16
            | Self::Rgba8
            | Self::Rgba16
            | Self::Argb8
            | Self::Argb16
            | Self::Bgra8
            | Self::Bgra16 => ColorType::Rgb,
            Self::Cmyk8
            | Self::Cmyk16
            | Self::Cmyka8
            | Self::Cmyka16
            | Self::Ymck8
            | Self::Ymck16 => ColorType::Cmyk,
            Self::Gray8 | Self::Gray16 => ColorType::Gray,
            Self::LabA8 | Self::LabDbl => ColorType::Lab,
        }
    }

    /// Number of interleaved channels, alpha included
    pub const fn num_channels(self) -> usize {
        match self {
            Self::Undefined => 0,
            Self::Gray8 | Self::Gray16 => 1,
            Self::Rgb8 | Self::Rgb16 | Self::LabDbl => 3,
            Self::Rgba8
            | Self::Rgba16
            | Self::Argb8
            | Self::Argb16
            | Self::Bgra8
            | Self::Bgra16
            | Self::Cmyk8
            | Self::Cmyk16
            | Self::Ymck8
            | Self::Ymck16
            | Self::LabA8 => 4,
            Self::Cmyka8 | Self::Cmyka16 => 5,
        }
    }

    /// Storage width of one channel in bytes
    pub const fn bytes_per_channel(self) -> usize {
        match self {
            Self::Undefined => 0,
            Self::Rgb8
            | Self::Rgba8
            | Self::Argb8
            | Self::Bgra8
            | Self::Cmyk8
            | Self::Cmyka8
            | Self::Ymck8
            | Self::Gray8
            | Self::LabA8 => 1,
            Self::Rgb16
            | Self::Rgba16
            | Self::Argb16
            | Self::Bgra16
            | Self::Cmyk16
            | Self::Cmyka16
            | Self::Ymck16
            | Self::Gray16 => 2,
            Self::LabDbl => std::mem::size_of::<f64>(),
        }
    }

    /// Whether the encoding carries an alpha channel
    pub const fn has_alpha(self) -> bool {
        matches!(
            self,
            Self::Rgba8
                | Self::Rgba16
                | Self::Argb8
                | Self::Argb16
                | Self::Bgra8
                | Self::Bgra16
                | Self::Cmyka8
                | Self::Cmyka16
                | Self::LabA8
        )
    }

    /// Size of one packed pixel in bytes
    pub const fn bytes_per_pixel(self) -> usize {
        self.num_channels() * self.bytes_per_channel()
    }

    /// Number of color (non-alpha) channels
    pub const fn color_channels(self) -> usize {
        if self.has_alpha() {
            self.num_channels() - 1
        } else {
            self.num_channels()
        }
    }

    /// Whether channels are stored as floating point values
    pub const fn is_float(self) -> bool {
        matches!(self, Self::LabDbl)
    }
}

/// Color model family of `format`
pub fn color_format_type(format: ColorFormat) -> ColorType {
    format.color_type()
}

/// Channel count of `format`, alpha included
pub fn color_format_num_channels(format: ColorFormat) -> usize {
    format.num_channels()
}

/// Bytes per channel of `format` (1, 2 or 8; 0 when undefined)
pub fn color_format_bytes_per_channel(format: ColorFormat) -> usize {
    format.bytes_per_channel()
}

/// Whether `format` carries alpha
pub fn color_format_has_alpha(format: ColorFormat) -> bool {
    format.has_alpha()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_format_is_described() {
        for format in ColorFormat::ALL {
            let family = color_format_type(format);
            let channels = color_format_num_channels(format);
            let bytes = color_format_bytes_per_channel(format);

            if format == ColorFormat::Undefined {
                assert_eq!(family, ColorType::Unknown);
                assert_eq!(channels, 0);
                assert_eq!(bytes, 0);
                assert!(!color_format_has_alpha(format));
                continue;
            }

            assert_ne!(family, ColorType::Unknown, "{format:?} has no family");
            assert!(channels > 0, "{format:?} has no channels");
            assert!(matches!(bytes, 1 | 2 | 8), "{format:?} has width {bytes}");
            assert!(format.color_channels() >= 1);
        }
    }

    #[test]
    fn test_channel_counts() {
        assert_eq!(color_format_num_channels(ColorFormat::Rgb8), 3);
        assert_eq!(color_format_num_channels(ColorFormat::Rgba16), 4);
        assert_eq!(color_format_num_channels(ColorFormat::Cmyk8), 4);
        assert_eq!(color_format_num_channels(ColorFormat::Cmyka16), 5);
        assert_eq!(color_format_num_channels(ColorFormat::Gray8), 1);
        assert_eq!(color_format_num_channels(ColorFormat::LabDbl), 3);
    }

    #[test]
    fn test_bytes_per_channel() {
        assert_eq!(color_format_bytes_per_channel(ColorFormat::Bgra8), 1);
        assert_eq!(color_format_bytes_per_channel(ColorFormat::Ymck16), 2);
        assert_eq!(color_format_bytes_per_channel(ColorFormat::LabDbl), 8);
        assert_eq!(ColorFormat::LabDbl.bytes_per_pixel(), 24);
        assert_eq!(ColorFormat::Cmyka16.bytes_per_pixel(), 10);
    }

    #[test]
    fn test_alpha_presence() {
        let with_alpha: Vec<_> = ColorFormat::ALL
            .into_iter()
            .filter(|f| color_format_has_alpha(*f))
            .collect();
        assert_eq!(
            with_alpha,
            vec![
                ColorFormat::Rgba8,
                ColorFormat::Rgba16,
                ColorFormat::Argb8,
                ColorFormat::Argb16,
                ColorFormat::Bgra8,
                ColorFormat::Bgra16,
                ColorFormat::Cmyka8,
                ColorFormat::Cmyka16,
                ColorFormat::LabA8,
            ]
        );
    }

    #[test]
    fn test_from_raw_out_of_range() {
        assert_eq!(ColorFormat::from_raw(1), ColorFormat::Rgb8);
        assert_eq!(ColorFormat::from_raw(18), ColorFormat::LabDbl);
        assert_eq!(ColorFormat::from_raw(19), ColorFormat::Undefined);
        assert_eq!(ColorFormat::from_raw(u32::MAX), ColorFormat::Undefined);
    }
}
