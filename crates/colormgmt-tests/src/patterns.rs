//! Test pattern generation
//!
//! Patterns are produced as packed RGB8 and then laid out in any RGB-family
//! [`ColorFormat`] with [`pack_rgb8`], so one pattern can drive every channel
//! order and depth an engine accepts.

use colormgmt_core::{ChannelMap, ColorFormat};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Test pattern types
#[derive(Debug, Clone, Copy)]
pub enum TestPattern {
    /// Horizontal gradient black to white
    Gradient,
    /// RGB color cube corners (8 colors)
    ColorCube,
    /// Hue ramp at full saturation
    HueRamp,
    /// Random pixels with seed
    Random(u64),
    /// Skin tone samples
    SkinTones,
    /// All zeros (black)
    Black,
    /// All 255 (white)
    White,
}

impl TestPattern {
    /// Patterns exercised by the parity suites
    pub const STANDARD: [TestPattern; 6] = [
        TestPattern::Gradient,
        TestPattern::ColorCube,
        TestPattern::HueRamp,
        TestPattern::Random(0x5eed),
        TestPattern::SkinTones,
        TestPattern::White,
    ];
}

const CUBE: [[u8; 3]; 8] = [
    [0, 0, 0],
    [255, 0, 0],
    [0, 255, 0],
    [0, 0, 255],
    [255, 255, 0],
    [255, 0, 255],
    [0, 255, 255],
    [255, 255, 255],
];

const SKIN: [[u8; 3]; 6] = [
    [255, 224, 189],
    [241, 194, 125],
    [224, 172, 105],
    [198, 134, 66],
    [141, 85, 36],
    [89, 47, 42],
];

/// Generate `count` pixels of `pattern` as packed RGB8
pub fn generate_pattern(pattern: TestPattern, count: usize) -> Vec<u8> {
    if let TestPattern::Random(seed) = pattern {
        let mut data = vec![0u8; count * 3];
        ChaCha8Rng::seed_from_u64(seed).fill_bytes(&mut data);
        return data;
    }

    (0..count)
        .flat_map(|i| match pattern {
            TestPattern::Gradient => {
                let v = (i * 255 / count.max(2).saturating_sub(1)).min(255) as u8;
                [v, v, v]
            }
            TestPattern::ColorCube => CUBE[i % CUBE.len()],
            TestPattern::HueRamp => hsl_to_rgb(i as f32 * 360.0 / count as f32, 1.0, 0.5),
            TestPattern::SkinTones => SKIN[i % SKIN.len()],
            TestPattern::Black => [0, 0, 0],
            TestPattern::White | TestPattern::Random(_) => [255, 255, 255],
        })
        .collect()
}

/// Deterministic, non-constant alpha for pixel `index`
pub fn alpha_at(index: usize) -> u8 {
    (index * 37 % 251) as u8 + 3
}

/// Lay out packed RGB8 pixels in an RGB-family `format`
///
/// Alpha, where the format has it, comes from [`alpha_at`]. 16-bit channels
/// are written native-endian as `v * 257`. Returns `None` for formats that
/// are not RGB.
pub fn pack_rgb8(rgb: &[u8], format: ColorFormat) -> Option<Vec<u8>> {
    let Some(ChannelMap::Rgb { r, g, b, alpha }) = ChannelMap::for_format(format) else {
        return None;
    };
    let width = format.bytes_per_channel();
    let mut out = vec![0u8; rgb.len() / 3 * format.bytes_per_pixel()];

    for (i, (src, dst)) in rgb
        .chunks_exact(3)
        .zip(out.chunks_exact_mut(format.bytes_per_pixel()))
        .enumerate()
    {
        let mut put = |channel: usize, v: u8| {
            let slot = &mut dst[channel * width..(channel + 1) * width];
            if width == 2 {
                slot.copy_from_slice(&(u16::from(v) * 257).to_ne_bytes());
            } else {
                slot[0] = v;
            }
        };
        put(r, src[0]);
        put(g, src[1]);
        put(b, src[2]);
        if let Some(a) = alpha {
            put(a, alpha_at(i));
        }
    }
    Some(out)
}

/// Read RGB-family pixels back as packed RGB8, rounding 16-bit channels
pub fn unpack_rgb8(data: &[u8], format: ColorFormat) -> Option<Vec<u8>> {
    let Some(ChannelMap::Rgb { r, g, b, .. }) = ChannelMap::for_format(format) else {
        return None;
    };
    let width = format.bytes_per_channel();
    let read = |pixel: &[u8], channel: usize| -> u8 {
        if width == 2 {
            let v = u16::from_ne_bytes([pixel[channel * 2], pixel[channel * 2 + 1]]);
            ((u32::from(v) + 128) / 257) as u8
        } else {
            pixel[channel]
        }
    };
    Some(
        data.chunks_exact(format.bytes_per_pixel())
            .flat_map(|pixel| [read(pixel, r), read(pixel, g), read(pixel, b)])
            .collect(),
    )
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [u8; 3] {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [r, g, b].map(|v| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8)
}

/// Standard pixel counts
pub mod sizes {
    pub const TINY: usize = 64;
    pub const SMALL: usize = 4096;
    pub const LARGE: usize = 1920 * 1080;
}
