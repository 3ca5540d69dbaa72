//! Per-format channel layout adapters
//!
//! A [`ColorSpaceData`] binds one pixel format to one profile and answers
//! where each logical channel lives inside a packed pixel. The channel map is
//! chosen once at construction from the format tag and never changes.
//!
//! Index assignments reproduce the legacy layouts exactly, including the
//! YMCK order (yellow first, cyan third) used by some codecs.

use crate::format::ColorFormat;
use crate::profile::ColorProfile;
use crate::structs::ColorType;

/// Channel positions for one packed pixel layout, in channel units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMap {
    Rgb {
        r: usize,
        g: usize,
        b: usize,
        alpha: Option<usize>,
    },
    Cmyk {
        c: usize,
        m: usize,
        y: usize,
        k: usize,
        alpha: Option<usize>,
    },
    Gray {
        gray: usize,
    },
    Lab {
        l: usize,
        a: usize,
        b: usize,
        alpha: Option<usize>,
    },
}

impl ChannelMap {
    /// Channel map of `format`, or `None` for `Undefined`
    pub const fn for_format(format: ColorFormat) -> Option<Self> {
        let map = match format {
            ColorFormat::Undefined => return None,
            ColorFormat::Rgb8 | ColorFormat::Rgb16 => Self::Rgb {
                r: 0,
                g: 1,
                b: 2,
                alpha: None,
            },
            ColorFormat::Rgba8 | ColorFormat::Rgba16 => Self::Rgb {
                r: 0,
                g: 1,
                b: 2,
                alpha: Some(3),
            },
            ColorFormat::Argb8 | ColorFormat::Argb16 => Self::Rgb {
                r: 1,
                g: 2,
                b: 3,
                alpha: Some(0),
            },
            ColorFormat::Bgra8 | ColorFormat::Bgra16 => Self::Rgb {
                r: 2,
                g: 1,
                b: 0,
                alpha: Some(3),
            },
            ColorFormat::Cmyk8 | ColorFormat::Cmyk16 => Self::Cmyk {
                c: 0,
                m: 1,
                y: 2,
                k: 3,
                alpha: None,
            },
            ColorFormat::Cmyka8 | ColorFormat::Cmyka16 => Self::Cmyk {
                c: 0,
                m: 1,
                y: 2,
                k: 3,
                alpha: Some(4),
            },
            ColorFormat::Ymck8 | ColorFormat::Ymck16 => Self::Cmyk {
                c: 2,
                m: 1,
                y: 0,
                k: 3,
                alpha: None,
            },
            ColorFormat::Gray8 | ColorFormat::Gray16 => Self::Gray { gray: 0 },
            ColorFormat::LabA8 => Self::Lab {
                l: 0,
                a: 1,
                b: 2,
                alpha: Some(3),
            },
            ColorFormat::LabDbl => Self::Lab {
                l: 0,
                a: 1,
                b: 2,
                alpha: None,
            },
        };
        Some(map)
    }

    /// Family this map belongs to
    pub const fn color_type(&self) -> ColorType {
        match self {
            Self::Rgb { .. } => ColorType::Rgb,
            Self::Cmyk { .. } => ColorType::Cmyk,
            Self::Gray { .. } => ColorType::Gray,
            Self::Lab { .. } => ColorType::Lab,
        }
    }

    /// Alpha position, if the layout has one
    pub const fn alpha(&self) -> Option<usize> {
        match *self {
            Self::Rgb { alpha, .. } | Self::Cmyk { alpha, .. } | Self::Lab { alpha, .. } => alpha,
            Self::Gray { .. } => None,
        }
    }

    /// Positions of the color channels in canonical order (RGB, CMYK, gray, Lab)
    pub fn color_indices(&self) -> Vec<usize> {
        match *self {
            Self::Rgb { r, g, b, .. } => vec![r, g, b],
            Self::Cmyk { c, m, y, k, .. } => vec![c, m, y, k],
            Self::Gray { gray } => vec![gray],
            Self::Lab { l, a, b, .. } => vec![l, a, b],
        }
    }
}

/// Channel layout adapter bound to a format and a profile
#[derive(Debug, Clone)]
pub struct ColorSpaceData {
    format: ColorFormat,
    profile: ColorProfile,
    channels: ChannelMap,
}

impl ColorSpaceData {
    /// Bind `format` to `profile`, picking the layout from the format tag
    ///
    /// The profile may be null. Binding a profile whose color space does not
    /// belong to the format's family is a caller bug (checked in debug builds).
    pub fn new(format: ColorFormat, profile: &ColorProfile) -> Self {
        debug_assert!(
            format != ColorFormat::Undefined,
            "ColorSpaceData needs a defined format"
        );
        let channels = ChannelMap::for_format(format).unwrap_or(ChannelMap::Gray { gray: 0 });
        if !profile.is_null() {
            debug_assert!(
                profile.color_space().accepts(format.color_type()),
                "profile color space {:?} does not match {:?}",
                profile.color_space(),
                format
            );
        }
        Self {
            format,
            profile: profile.clone(),
            channels,
        }
    }

    /// RGB family adapter (RGB, RGBA, ARGB, BGRA)
    pub fn rgb(format: ColorFormat, profile: &ColorProfile) -> Self {
        debug_assert_eq!(format.color_type(), ColorType::Rgb, "{format:?} is not RGB");
        Self::new(format, profile)
    }

    /// CMYK family adapter (CMYK, CMYKA, YMCK)
    pub fn cmyk(format: ColorFormat, profile: &ColorProfile) -> Self {
        debug_assert_eq!(format.color_type(), ColorType::Cmyk, "{format:?} is not CMYK");
        Self::new(format, profile)
    }

    /// Gray family adapter
    pub fn gray(format: ColorFormat, profile: &ColorProfile) -> Self {
        debug_assert_eq!(format.color_type(), ColorType::Gray, "{format:?} is not gray");
        Self::new(format, profile)
    }

    /// Lab family adapter
    pub fn lab(format: ColorFormat, profile: &ColorProfile) -> Self {
        debug_assert_eq!(format.color_type(), ColorType::Lab, "{format:?} is not Lab");
        Self::new(format, profile)
    }

    pub fn format(&self) -> ColorFormat {
        self.format
    }

    pub fn profile(&self) -> &ColorProfile {
        &self.profile
    }

    pub fn channels(&self) -> ChannelMap {
        self.channels
    }

    /// Channel position of alpha; 0 for layouts without alpha
    pub fn alpha_index(&self) -> usize {
        self.channels.alpha().unwrap_or(0)
    }

    pub fn has_alpha(&self) -> bool {
        self.channels.alpha().is_some()
    }

    /// Position of red, cyan, gray or L, depending on family
    pub fn first_color_index(&self) -> usize {
        self.channels.color_indices()[0]
    }

    /// Force every pixel's alpha to full opacity
    ///
    /// Walks `count` pixels of a packed byte buffer with a stride of one
    /// pixel. The written value is the maximum of the channel's integer
    /// width, so 16-bit layouts receive 65535. No-op for layouts without
    /// alpha.
    pub fn flatten_alpha(&self, data: &mut [u8], count: usize) {
        let Some(alpha) = self.channels.alpha() else {
            return;
        };
        let width = self.format.bytes_per_channel();
        let offset = alpha * width;
        for pixel in data
            .chunks_exact_mut(self.format.bytes_per_pixel())
            .take(count)
        {
            match width {
                1 => pixel[offset] = u8::MAX,
                2 => pixel[offset..offset + 2].copy_from_slice(&u16::MAX.to_ne_bytes()),
                _ => {}
            }
        }
    }

    /// [`flatten_alpha`](Self::flatten_alpha) for 16-bit layouts stored as `u16`
    pub fn flatten_alpha_u16(&self, data: &mut [u16], count: usize) {
        debug_assert_eq!(self.format.bytes_per_channel(), 2);
        let Some(alpha) = self.channels.alpha() else {
            return;
        };
        for pixel in data
            .chunks_exact_mut(self.format.num_channels())
            .take(count)
        {
            pixel[alpha] = u16::MAX;
        }
    }
}
