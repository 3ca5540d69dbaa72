//! Channel-order adaptation shared by the backends
//!
//! Backends only build transforms over a small set of native layouts
//! (RGB, RGBA, CMYK, gray, `f64` Lab). Every other format is mapped onto one
//! of those: channels are shuffled into canonical order before the native
//! call and back afterwards, and alpha is settled by
//! [`finish_alpha`](crate::transform::finish_alpha) once the colors are done.

use crate::format::ColorFormat;
use crate::space_data::ChannelMap;
use crate::transform::{ColorTransformImpl, buffers_fit, finish_alpha};
use crate::Result;
use std::borrow::Cow;
use tracing::warn;

/// A backend transform over native layouts
pub trait NativeTransform {
    /// Convert exactly `count` pixels; both slices have exact lengths
    fn run(&self, input: &[u8], output: &mut [u8], count: usize) -> Result<()>;
}

/// Layout a backend is asked to handle in place of `format`
pub const fn native_format(format: ColorFormat) -> ColorFormat {
    match format {
        ColorFormat::Argb8 | ColorFormat::Bgra8 => ColorFormat::Rgba8,
        ColorFormat::Argb16 | ColorFormat::Bgra16 => ColorFormat::Rgba16,
        ColorFormat::Cmyka8 | ColorFormat::Ymck8 => ColorFormat::Cmyk8,
        ColorFormat::Cmyka16 | ColorFormat::Ymck16 => ColorFormat::Cmyk16,
        ColorFormat::LabA8 => ColorFormat::LabDbl,
        other => other,
    }
}

/// Source channel for each native channel, in native order
fn native_order(format: ColorFormat) -> Vec<usize> {
    let Some(map) = ChannelMap::for_format(format) else {
        return Vec::new();
    };
    let native_channels = native_format(format).num_channels();
    map.color_indices()
        .into_iter()
        .chain(map.alpha())
        .take(native_channels)
        .collect()
}

/// Copy `count` pixels of `format` into its native layout
pub(crate) fn to_native(format: ColorFormat, src: &[u8], count: usize) -> Vec<u8> {
    let native = native_format(format);
    let mut out = vec![0u8; count * native.bytes_per_pixel()];
    let src_pixels = src.chunks_exact(format.bytes_per_pixel());

    if format == ColorFormat::LabA8 {
        for (pixel, dst) in src_pixels.zip(out.chunks_exact_mut(24)).take(count) {
            let lab = [
                f64::from(pixel[0]) * 100.0 / 255.0,
                f64::from(pixel[1]) - 128.0,
                f64::from(pixel[2]) - 128.0,
            ];
            for (v, slot) in lab.iter().zip(dst.chunks_exact_mut(8)) {
                slot.copy_from_slice(&v.to_ne_bytes());
            }
        }
        return out;
    }

    let width = format.bytes_per_channel();
    let order = native_order(format);
    for (pixel, dst) in src_pixels
        .zip(out.chunks_exact_mut(native.bytes_per_pixel()))
        .take(count)
    {
        for (i, &from) in order.iter().enumerate() {
            dst[i * width..(i + 1) * width].copy_from_slice(&pixel[from * width..(from + 1) * width]);
        }
    }
    out
}

/// Scatter `count` native pixels back into `format`
///
/// Channels with no native counterpart (alpha of CMYKA) are left untouched.
pub(crate) fn from_native(format: ColorFormat, native: &[u8], dst: &mut [u8], count: usize) {
    let native_bpp = native_format(format).bytes_per_pixel();
    let dst_pixels = dst.chunks_exact_mut(format.bytes_per_pixel());

    if format == ColorFormat::LabA8 {
        for (src, pixel) in native.chunks_exact(native_bpp).zip(dst_pixels).take(count) {
            let mut lab = [0f64; 3];
            for (v, bytes) in lab.iter_mut().zip(src.chunks_exact(8)) {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                *v = f64::from_ne_bytes(raw);
            }
            pixel[0] = (lab[0] * 255.0 / 100.0).round().clamp(0.0, 255.0) as u8;
            pixel[1] = (lab[1] + 128.0).round().clamp(0.0, 255.0) as u8;
            pixel[2] = (lab[2] + 128.0).round().clamp(0.0, 255.0) as u8;
        }
        return;
    }

    let width = format.bytes_per_channel();
    let order = native_order(format);
    for (src, pixel) in native.chunks_exact(native_bpp).zip(dst_pixels).take(count) {
        for (i, &to) in order.iter().enumerate() {
            pixel[to * width..(to + 1) * width].copy_from_slice(&src[i * width..(i + 1) * width]);
        }
    }
}

/// [`ColorTransformImpl`] over a native backend transform
pub struct RepackTransform {
    input_format: ColorFormat,
    output_format: ColorFormat,
    native: Option<Box<dyn NativeTransform>>,
}

impl RepackTransform {
    pub fn new(
        input_format: ColorFormat,
        output_format: ColorFormat,
        native: Box<dyn NativeTransform>,
    ) -> Self {
        Self {
            input_format,
            output_format,
            native: Some(native),
        }
    }

    /// A transform that holds no native object
    pub fn null(input_format: ColorFormat, output_format: ColorFormat) -> Self {
        Self {
            input_format,
            output_format,
            native: None,
        }
    }
}

impl ColorTransformImpl for RepackTransform {
    fn is_null(&self) -> bool {
        self.native.is_none()
    }

    fn input_format(&self) -> ColorFormat {
        self.input_format
    }

    fn output_format(&self) -> ColorFormat {
        self.output_format
    }

    fn apply(&self, input: &[u8], output: &mut [u8], count: usize) -> bool {
        let Some(native) = &self.native else {
            return false;
        };
        if !buffers_fit(self.input_format, input, self.output_format, output, count) {
            return false;
        }
        let input = &input[..count * self.input_format.bytes_per_pixel()];
        let output = &mut output[..count * self.output_format.bytes_per_pixel()];

        let native_in = native_format(self.input_format);
        let native_out = native_format(self.output_format);
        let src: Cow<'_, [u8]> = if native_in == self.input_format {
            Cow::Borrowed(input)
        } else {
            Cow::Owned(to_native(self.input_format, input, count))
        };

        let result = if native_out == self.output_format {
            native.run(&src, output, count)
        } else {
            let mut converted = vec![0u8; count * native_out.bytes_per_pixel()];
            native
                .run(&src, &mut converted, count)
                .map(|()| from_native(self.output_format, &converted, output, count))
        };
        if let Err(err) = result {
            warn!(error = %err, input = ?self.input_format, output = ?self.output_format, "native transform failed");
            return false;
        }

        finish_alpha(self.input_format, input, self.output_format, output, count);
        true
    }
}
