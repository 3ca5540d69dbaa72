//! moxcms backend
//!
//! Pure Rust engine. Same-depth integer requests run on moxcms' 8 and 16 bit
//! executors directly; mixed depths, Lab data and soft-proofing go through
//! the `f32` executors on normalized samples. Soft-proofing is a chain of two
//! transforms (input to proof, proof to output). Gamut checking has no moxcms
//! counterpart and is refused. Black point compensation and black
//! preservation are accepted but have no effect.
//!
//! The built-in Lab profile is a linear matrix-shaper with identity colorants,
//! so its device values are D50 PCS XYZ scaled by the white point. Lab pixels
//! for it are converted to and from that XYZ before and after the executors.

use super::repack::{NativeTransform, RepackTransform, native_format};
use super::{ColorMgmtEngine, EngineBackend, TransformRequest, native_profile};
use crate::color::{D50, Lab, Xyz};
use crate::format::ColorFormat;
use crate::profile::{ColorProfile, ColorProfileImpl, profile_data_hash};
use crate::structs::{ColorSpaceType, ColorTransformFlags, Illuminant, ProfileClass, RenderIntent};
use crate::transform::ColorTransformImpl;
use crate::{Error, Result};
use moxcms::{Layout, TransformExecutor, TransformOptions};
use std::any::Any;
use std::sync::Arc;
use tracing::debug;

/// Engine id of the moxcms backend
pub const MOXCMS_ENGINE_ID: i32 = 2;

const SRGB_ID: &str = "memprofile://moxcms sRGB profile";
const LAB_D50_ID: &str = "memprofile://moxcms Lab D50 profile";

/// moxcms backed [`EngineBackend`]
#[derive(Debug, Default)]
pub struct MoxcmsEngine;

impl MoxcmsEngine {
    pub fn new() -> Self {
        Self
    }
}

/// Parsed moxcms profile
pub struct MoxcmsProfile {
    profile: moxcms::ColorProfile,
    /// Built-in Lab profile backed by the XYZ identity shaper
    pcs_lab: bool,
}

impl MoxcmsProfile {
    fn parsed(profile: moxcms::ColorProfile) -> Self {
        Self {
            profile,
            pcs_lab: false,
        }
    }

    fn lab_d50() -> Self {
        let mut profile = moxcms::ColorProfile::new_srgb();
        profile.red_colorant = moxcms::Xyzd { x: 1.0, y: 0.0, z: 0.0 };
        profile.green_colorant = moxcms::Xyzd { x: 0.0, y: 1.0, z: 0.0 };
        profile.blue_colorant = moxcms::Xyzd { x: 0.0, y: 0.0, z: 1.0 };
        let linear = moxcms::curve_from_gamma(1.0);
        profile.red_trc = Some(linear.clone());
        profile.green_trc = Some(linear.clone());
        profile.blue_trc = Some(linear);
        profile.cicp = None;
        profile.media_white_point = None;
        profile.description = Some(moxcms::ProfileText::PlainString("Lab D50".into()));
        Self {
            profile,
            pcs_lab: true,
        }
    }

    pub fn profile(&self) -> &moxcms::ColorProfile {
        &self.profile
    }
}

impl ColorProfileImpl for MoxcmsProfile {
    fn color_space(&self) -> ColorSpaceType {
        if self.pcs_lab {
            return ColorSpaceType::Lab;
        }
        self.profile.color_space.into()
    }

    fn device_class(&self) -> ProfileClass {
        if self.pcs_lab {
            return ProfileClass::Abstract;
        }
        self.profile.profile_class.into()
    }

    fn product_description(&self) -> String {
        self.profile
            .description
            .as_ref()
            .map(|text| match text {
                moxcms::ProfileText::PlainString(s) => s.clone(),
                moxcms::ProfileText::Localizable(locs) => {
                    locs.first().map(|l| l.value.clone()).unwrap_or_default()
                }
                moxcms::ProfileText::Description(desc) => desc.ascii_string.clone(),
            })
            .map(|s| s.trim_end_matches('\0').to_string())
            .unwrap_or_default()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl EngineBackend for MoxcmsEngine {
    fn engine_id(&self) -> i32 {
        MOXCMS_ENGINE_ID
    }

    fn description(&self) -> &str {
        "moxcms"
    }

    fn open_profile(&self, engine: &ColorMgmtEngine, data: &[u8], path: &str) -> Result<ColorProfile> {
        let profile = moxcms::ColorProfile::new_from_slice(data)
            .map_err(|e| Error::ProfileParse(format!("{:?}", e)))?;
        Ok(ColorProfile::new(
            engine.clone(),
            Box::new(MoxcmsProfile::parsed(profile)),
            path,
            profile_data_hash(data),
        ))
    }

    fn create_srgb_profile(&self, engine: &ColorMgmtEngine) -> Result<ColorProfile> {
        Ok(ColorProfile::new(
            engine.clone(),
            Box::new(MoxcmsProfile::parsed(moxcms::ColorProfile::new_srgb())),
            "",
            SRGB_ID,
        ))
    }

    fn create_lab_profile(
        &self,
        engine: &ColorMgmtEngine,
        illuminant: Illuminant,
    ) -> Result<ColorProfile> {
        if illuminant != Illuminant::D50 {
            return Err(Error::UnsupportedColorSpace(format!(
                "moxcms only provides a D50 Lab profile, not {:?}",
                illuminant
            )));
        }
        Ok(ColorProfile::new(
            engine.clone(),
            Box::new(MoxcmsProfile::lab_d50()),
            "",
            LAB_D50_ID,
        ))
    }

    fn create_transform(&self, request: &TransformRequest<'_>) -> Result<Box<dyn ColorTransformImpl>> {
        if request.flags.contains(ColorTransformFlags::GAMUT_CHECK) {
            return Err(Error::Transform("gamut checking is not supported by moxcms".into()));
        }
        let unsupported = request.flags
            & (ColorTransformFlags::BLACK_POINT_COMPENSATION | ColorTransformFlags::BLACK_PRESERVATION);
        if !unsupported.is_empty() {
            debug!(flags = ?unsupported, "moxcms ignores black point flags");
        }
        let input_profile = native_profile::<MoxcmsProfile>(request.input)?;
        let output_profile = native_profile::<MoxcmsProfile>(request.output)?;
        let input = &input_profile.profile;
        let output = &output_profile.profile;
        let input_samples = SampleCoding::of(input_profile);
        let output_samples = SampleCoding::of(output_profile);
        let input_format = native_format(request.input_format);
        let output_format = native_format(request.output_format);
        let input_layout = format_layout(input_format)?;
        let output_layout = format_layout(output_format)?;

        let native: Box<dyn NativeTransform> = match request.proofing {
            Some(proofing) => {
                let proof = &native_profile::<MoxcmsProfile>(proofing)?.profile;
                let proof_layout = space_layout(proof.color_space.into())?;
                let to_proof = float_executor(
                    input,
                    input_layout,
                    proof,
                    proof_layout,
                    request.render_intent,
                )?;
                let from_proof = float_executor(
                    proof,
                    proof_layout,
                    output,
                    output_layout,
                    request.proofing_intent,
                )?;
                Box::new(FloatChain {
                    input: (input_format, input_samples),
                    output: (output_format, output_samples),
                    stages: vec![
                        (to_proof, proof_layout.channels()),
                        (from_proof, output_layout.channels()),
                    ],
                })
            }
            None if is_integer_pair(input_format, output_format, 1) => {
                let executor = input
                    .create_transform_8bit(input_layout, output, output_layout, options(request.render_intent))
                    .map_err(cms_error)?;
                Box::new(Executor8(executor.into()))
            }
            None if is_integer_pair(input_format, output_format, 2) => {
                let executor = input
                    .create_transform_16bit(input_layout, output, output_layout, options(request.render_intent))
                    .map_err(cms_error)?;
                Box::new(Executor16(executor.into()))
            }
            None => {
                let executor =
                    float_executor(input, input_layout, output, output_layout, request.render_intent)?;
                Box::new(FloatChain {
                    input: (input_format, input_samples),
                    output: (output_format, output_samples),
                    stages: vec![(executor, output_layout.channels())],
                })
            }
        };

        Ok(Box::new(RepackTransform::new(
            request.input_format,
            request.output_format,
            native,
        )))
    }
}

fn options(intent: RenderIntent) -> TransformOptions {
    TransformOptions {
        rendering_intent: intent.into(),
        ..Default::default()
    }
}

fn cms_error(err: moxcms::CmsError) -> Error {
    Error::Transform(format!("{:?}", err))
}

fn float_executor(
    src: &moxcms::ColorProfile,
    src_layout: Layout,
    dst: &moxcms::ColorProfile,
    dst_layout: Layout,
    intent: RenderIntent,
) -> Result<Arc<moxcms::TransformF32BitExecutor>> {
    let executor = src
        .create_transform_f32(src_layout, dst, dst_layout, options(intent))
        .map_err(cms_error)?;
    Ok(executor.into())
}

/// Both formats are integer with `width` bytes per channel
fn is_integer_pair(input: ColorFormat, output: ColorFormat, width: usize) -> bool {
    !input.is_float()
        && !output.is_float()
        && input.bytes_per_channel() == width
        && output.bytes_per_channel() == width
}

/// moxcms layout of a native format; CMYK travels as four-channel `Rgba`
fn format_layout(format: ColorFormat) -> Result<Layout> {
    Ok(match format {
        ColorFormat::Rgb8 | ColorFormat::Rgb16 | ColorFormat::LabDbl => Layout::Rgb,
        ColorFormat::Rgba8 | ColorFormat::Rgba16 | ColorFormat::Cmyk8 | ColorFormat::Cmyk16 => {
            Layout::Rgba
        }
        ColorFormat::Gray8 | ColorFormat::Gray16 => Layout::Gray,
        other => return Err(Error::UnsupportedFormat(other)),
    })
}

/// Layout used for intermediate data in a profile's color space
fn space_layout(space: ColorSpaceType) -> Result<Layout> {
    match space {
        ColorSpaceType::Rgb | ColorSpaceType::Lab | ColorSpaceType::Xyz => Ok(Layout::Rgb),
        ColorSpaceType::Cmyk => Ok(Layout::Rgba),
        ColorSpaceType::Gray => Ok(Layout::Gray),
        other => Err(Error::UnsupportedColorSpace(format!(
            "{:?} proofing profile",
            other
        ))),
    }
}

struct Executor8(Arc<moxcms::Transform8BitExecutor>);

impl NativeTransform for Executor8 {
    fn run(&self, input: &[u8], output: &mut [u8], _count: usize) -> Result<()> {
        self.0.transform(input, output).map_err(cms_error)
    }
}

struct Executor16(Arc<moxcms::Transform16BitExecutor>);

impl NativeTransform for Executor16 {
    fn run(&self, input: &[u8], output: &mut [u8], _count: usize) -> Result<()> {
        let src: Vec<u16> = input
            .chunks_exact(2)
            .map(|c| u16::from_ne_bytes([c[0], c[1]]))
            .collect();
        let mut dst = vec![0u16; output.len() / 2];
        self.0.transform(&src, &mut dst).map_err(cms_error)?;
        for (bytes, value) in output.chunks_exact_mut(2).zip(dst) {
            bytes.copy_from_slice(&value.to_ne_bytes());
        }
        Ok(())
    }
}

/// How `LabDbl` pixels map to executor samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SampleCoding {
    /// `L / 100`, `(a + 128) / 255`, `(b + 128) / 255`
    Normalized,
    /// XYZ relative to the D50 white, for the built-in Lab profile
    WhiteRelativeXyz,
}

impl SampleCoding {
    fn of(profile: &MoxcmsProfile) -> Self {
        if profile.pcs_lab {
            SampleCoding::WhiteRelativeXyz
        } else {
            SampleCoding::Normalized
        }
    }
}

/// One or more `f32` executors applied in sequence
struct FloatChain {
    input: (ColorFormat, SampleCoding),
    output: (ColorFormat, SampleCoding),
    /// Executor and the channel count it writes per pixel
    stages: Vec<(Arc<moxcms::TransformF32BitExecutor>, usize)>,
}

impl NativeTransform for FloatChain {
    fn run(&self, input: &[u8], output: &mut [u8], count: usize) -> Result<()> {
        let mut samples = decode_samples(self.input.0, self.input.1, input);
        for (executor, channels) in &self.stages {
            let mut next = vec![0f32; count * channels];
            executor.transform(&samples, &mut next).map_err(cms_error)?;
            samples = next;
        }
        encode_samples(self.output.0, self.output.1, &samples, output);
        Ok(())
    }
}

/// Native pixels to normalized `f32` samples
fn decode_samples(format: ColorFormat, coding: SampleCoding, data: &[u8]) -> Vec<f32> {
    match format.bytes_per_channel() {
        1 => data.iter().map(|&v| f32::from(v) / 255.0).collect(),
        2 => data
            .chunks_exact(2)
            .map(|c| f32::from(u16::from_ne_bytes([c[0], c[1]])) / 65535.0)
            .collect(),
        _ => data
            .chunks_exact(24)
            .flat_map(|px| {
                let mut lab = [0f64; 3];
                for (v, c) in lab.iter_mut().zip(px.chunks_exact(8)) {
                    let mut raw = [0u8; 8];
                    raw.copy_from_slice(c);
                    *v = f64::from_ne_bytes(raw);
                }
                lab_to_samples(Lab::from(lab), coding)
            })
            .collect(),
    }
}

/// Normalized `f32` samples back to native pixels, clamping integers
fn encode_samples(format: ColorFormat, coding: SampleCoding, samples: &[f32], out: &mut [u8]) {
    match format.bytes_per_channel() {
        1 => {
            for (dst, &v) in out.iter_mut().zip(samples) {
                *dst = (v * 255.0).round().clamp(0.0, 255.0) as u8;
            }
        }
        2 => {
            for (dst, &v) in out.chunks_exact_mut(2).zip(samples) {
                let value = (v * 65535.0).round().clamp(0.0, 65535.0) as u16;
                dst.copy_from_slice(&value.to_ne_bytes());
            }
        }
        _ => {
            for (dst, px) in out.chunks_exact_mut(24).zip(samples.chunks_exact(3)) {
                let lab = samples_to_lab([px[0], px[1], px[2]], coding);
                for (bytes, v) in dst.chunks_exact_mut(8).zip(lab.to_array()) {
                    bytes.copy_from_slice(&v.to_ne_bytes());
                }
            }
        }
    }
}

fn lab_to_samples(lab: Lab, coding: SampleCoding) -> [f32; 3] {
    match coding {
        SampleCoding::Normalized => [
            (lab.l / 100.0) as f32,
            ((lab.a + 128.0) / 255.0) as f32,
            ((lab.b + 128.0) / 255.0) as f32,
        ],
        SampleCoding::WhiteRelativeXyz => {
            let xyz = lab.to_xyz_with_white(&D50);
            [
                (xyz.x / D50.xyz.x) as f32,
                (xyz.y / D50.xyz.y) as f32,
                (xyz.z / D50.xyz.z) as f32,
            ]
        }
    }
}

fn samples_to_lab(samples: [f32; 3], coding: SampleCoding) -> Lab {
    let [s0, s1, s2] = samples.map(f64::from);
    match coding {
        SampleCoding::Normalized => Lab::new(s0 * 100.0, s1 * 255.0 - 128.0, s2 * 255.0 - 128.0),
        SampleCoding::WhiteRelativeXyz => Lab::from_xyz_with_white(
            Xyz::new(s0 * D50.xyz.x, s1 * D50.xyz.y, s2 * D50.xyz.z),
            &D50,
        ),
    }
}
