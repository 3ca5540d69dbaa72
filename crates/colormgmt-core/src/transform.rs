//! Color transform handles
//!
//! Three layers:
//!
//! - [`ColorTransformImpl`]: an engine's exclusive wrapper around one native
//!   transform. Not cloneable; dropping it releases the native object once.
//! - [`ColorTransformData`]: the wrapper plus the parameters it was built from
//!   and the engine that built it. Immutable after construction.
//! - [`ColorTransform`]: a cloneable, possibly null, reference-counted handle
//!   to the data. The last handle to go frees the native transform. Pools only
//!   ever hold weak references.

use crate::engine::ColorMgmtEngine;
use crate::format::ColorFormat;
use crate::space_data::ChannelMap;
use crate::structs::ColorTransformInfo;
use bytemuck::Pod;
use std::fmt;
use std::rc::{Rc, Weak};

/// Engine-specific wrapper around a native transform
pub trait ColorTransformImpl {
    /// True when no native transform is held
    fn is_null(&self) -> bool;

    /// Format expected in the input buffer
    fn input_format(&self) -> ColorFormat;

    /// Format written to the output buffer
    fn output_format(&self) -> ColorFormat;

    /// Convert `count` pixels from `input` into `output`
    ///
    /// Returns false without touching `output` when the transform is null or
    /// either buffer holds fewer than `count` pixels.
    fn apply(&self, input: &[u8], output: &mut [u8], count: usize) -> bool;

    /// Like [`apply`](Self::apply), growing `output` to fit `count` pixels
    fn apply_vec(&self, input: &[u8], output: &mut Vec<u8>, count: usize) -> bool {
        if self.is_null() || !fits(input, count, self.input_format()) {
            return false;
        }
        let Some(needed) = count.checked_mul(self.output_format().bytes_per_pixel()) else {
            return false;
        };
        if output.len() < needed {
            output.resize(needed, 0);
        }
        self.apply(input, output.as_mut_slice(), count)
    }
}

fn fits(buffer: &[u8], count: usize, format: ColorFormat) -> bool {
    count
        .checked_mul(format.bytes_per_pixel())
        .is_some_and(|needed| buffer.len() >= needed)
}

/// Check that both buffers can hold `count` pixels of their formats
pub fn buffers_fit(
    input_format: ColorFormat,
    input: &[u8],
    output_format: ColorFormat,
    output: &[u8],
    count: usize,
) -> bool {
    fits(input, count, input_format) && fits(output, count, output_format)
}

/// Settle the output alpha channel after the color channels were converted
///
/// Alpha is copied (rescaled between 8 and 16 bits) when both layouts carry
/// it, and forced opaque when only the output does.
pub fn finish_alpha(
    input_format: ColorFormat,
    input: &[u8],
    output_format: ColorFormat,
    output: &mut [u8],
    count: usize,
) {
    let Some(out_alpha) = ChannelMap::for_format(output_format).and_then(|m| m.alpha()) else {
        return;
    };
    let in_alpha = ChannelMap::for_format(input_format).and_then(|m| m.alpha());
    let in_width = input_format.bytes_per_channel();
    let out_width = output_format.bytes_per_channel();

    let in_pixels = input.chunks_exact(input_format.bytes_per_pixel().max(1));
    let out_pixels = output.chunks_exact_mut(output_format.bytes_per_pixel());
    for (src, dst) in in_pixels.zip(out_pixels).take(count) {
        let value = match in_alpha {
            Some(a) => read_channel(src, a, in_width),
            None => u16::MAX,
        };
        write_channel(dst, out_alpha, out_width, value);
    }
}

/// Read channel `index` as a 16-bit value
fn read_channel(pixel: &[u8], index: usize, width: usize) -> u16 {
    match width {
        1 => u16::from(pixel[index]) * 257,
        2 => u16::from_ne_bytes([pixel[index * 2], pixel[index * 2 + 1]]),
        _ => u16::MAX,
    }
}

/// Write a 16-bit value into channel `index`, narrowing to 8 bits if needed
fn write_channel(pixel: &mut [u8], index: usize, width: usize, value: u16) {
    match width {
        1 => pixel[index] = ((u32::from(value) + 128) / 257) as u8,
        2 => pixel[index * 2..index * 2 + 2].copy_from_slice(&value.to_ne_bytes()),
        _ => {}
    }
}

/// Backing store of a transform, shared by every [`ColorTransform`] handle
pub struct ColorTransformData {
    engine: ColorMgmtEngine,
    info: ColorTransformInfo,
    imp: Box<dyn ColorTransformImpl>,
}

impl ColorTransformData {
    pub fn new(
        engine: ColorMgmtEngine,
        info: ColorTransformInfo,
        imp: Box<dyn ColorTransformImpl>,
    ) -> Self {
        Self { engine, info, imp }
    }

    pub fn engine(&self) -> &ColorMgmtEngine {
        &self.engine
    }

    pub fn transform_info(&self) -> &ColorTransformInfo {
        &self.info
    }

    pub fn imp(&self) -> &dyn ColorTransformImpl {
        self.imp.as_ref()
    }
}

/// Shared, possibly null handle to a color transform
///
/// Cloning shares the backing data. Equality is identity of that data.
#[derive(Clone, Default)]
pub struct ColorTransform {
    data: Option<Rc<ColorTransformData>>,
}

impl ColorTransform {
    /// A handle that refers to no transform
    pub fn null() -> Self {
        Self { data: None }
    }

    /// Wrap a freshly built engine transform
    pub fn new(
        engine: ColorMgmtEngine,
        info: ColorTransformInfo,
        imp: Box<dyn ColorTransformImpl>,
    ) -> Self {
        Self::from_data(Rc::new(ColorTransformData::new(engine, info, imp)))
    }

    /// Promote an existing strong reference to a handle
    pub fn from_data(data: Rc<ColorTransformData>) -> Self {
        Self { data: Some(data) }
    }

    pub fn is_null(&self) -> bool {
        self.data.is_none()
    }

    /// Parameters the transform was built from; `None` for a null handle
    pub fn transform_info(&self) -> Option<&ColorTransformInfo> {
        self.data.as_ref().map(|d| &d.info)
    }

    /// Engine that built the transform; `None` for a null handle
    pub fn engine(&self) -> Option<&ColorMgmtEngine> {
        self.data.as_ref().map(|d| &d.engine)
    }

    pub fn weak_ref(&self) -> Weak<ColorTransformData> {
        self.data.as_ref().map(Rc::downgrade).unwrap_or_default()
    }

    pub fn strong_ref(&self) -> Option<Rc<ColorTransformData>> {
        self.data.clone()
    }

    /// Number of handles sharing the backing data
    pub fn ref_count(&self) -> usize {
        self.data.as_ref().map(Rc::strong_count).unwrap_or(0)
    }

    /// Convert `count` packed pixels; false if null or the buffers are too small
    pub fn apply(&self, input: &[u8], output: &mut [u8], count: usize) -> bool {
        match &self.data {
            Some(data) => data.imp.apply(input, output, count),
            None => false,
        }
    }

    /// Convert `count` packed pixels, growing `output` as needed; false if null
    pub fn apply_vec(&self, input: &[u8], output: &mut Vec<u8>, count: usize) -> bool {
        match &self.data {
            Some(data) => data.imp.apply_vec(input, output, count),
            None => false,
        }
    }

    /// Convert typed channel buffers (`u16` samples, `f64` Lab values, ...)
    pub fn apply_pixels<I: Pod, O: Pod>(&self, input: &[I], output: &mut [O], count: usize) -> bool {
        self.apply(
            bytemuck::cast_slice(input),
            bytemuck::cast_slice_mut(output),
            count,
        )
    }

    /// Whether both handles share the same backing data
    pub fn ptr_eq(&self, other: &ColorTransform) -> bool {
        self == other
    }
}

impl PartialEq for ColorTransform {
    fn eq(&self, other: &Self) -> bool {
        match (&self.data, &other.data) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl Eq for ColorTransform {}

impl fmt::Debug for ColorTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            None => f.write_str("ColorTransform(null)"),
            Some(data) => f
                .debug_struct("ColorTransform")
                .field("engine", &data.engine.engine_id())
                .field("info", &data.info)
                .finish(),
        }
    }
}
