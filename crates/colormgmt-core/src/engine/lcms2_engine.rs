//! Little CMS backend
//!
//! Wraps the `lcms2` crate. Native transforms are typed per pixel
//! (`[u8; N]` for an N-byte pixel) so the crate's size checks line up with
//! the packed layouts.

use super::repack::{NativeTransform, RepackTransform, native_format};
use super::{ColorMgmtEngine, EngineBackend, TransformRequest, native_profile};
use crate::format::ColorFormat;
use crate::profile::{ColorProfile, ColorProfileImpl, profile_data_hash};
use crate::structs::{ColorSpaceType, ColorTransformFlags, Illuminant, ProfileClass, RenderIntent};
use crate::transform::ColorTransformImpl;
use crate::{Error, Result};
use bytemuck::Pod;
use lcms2::{
    CIExyY, ColorSpaceSignature, Flags, GlobalContext, InfoType, Intent, Locale, PixelFormat,
    Profile, ProfileClassSignature, Transform,
};
use std::any::Any;

/// Engine id of the Little CMS backend
pub const LCMS2_ENGINE_ID: i32 = 1;

const SRGB_ID: &str = "memprofile://Internal sRGB profile";
const LAB_D50_ID: &str = "memprofile://Internal Lab D50 profile";
const LAB_D65_ID: &str = "memprofile://Internal Lab D65 profile";

/// Little CMS backed [`EngineBackend`]
#[derive(Debug, Default)]
pub struct Lcms2Engine;

impl Lcms2Engine {
    pub fn new() -> Self {
        Self
    }
}

/// Parsed lcms2 profile
pub struct Lcms2Profile {
    profile: Profile,
}

impl Lcms2Profile {
    pub fn profile(&self) -> &Profile {
        &self.profile
    }
}

impl ColorProfileImpl for Lcms2Profile {
    fn color_space(&self) -> ColorSpaceType {
        match self.profile.color_space() {
            ColorSpaceSignature::RgbData => ColorSpaceType::Rgb,
            ColorSpaceSignature::CmykData => ColorSpaceType::Cmyk,
            ColorSpaceSignature::CmyData => ColorSpaceType::Cmy,
            ColorSpaceSignature::GrayData => ColorSpaceType::Gray,
            ColorSpaceSignature::LabData => ColorSpaceType::Lab,
            ColorSpaceSignature::XYZData => ColorSpaceType::Xyz,
            ColorSpaceSignature::LuvData => ColorSpaceType::Luv,
            ColorSpaceSignature::YCbCrData => ColorSpaceType::YCbCr,
            ColorSpaceSignature::YxyData => ColorSpaceType::Yxy,
            ColorSpaceSignature::HsvData => ColorSpaceType::Hsv,
            ColorSpaceSignature::HlsData => ColorSpaceType::Hls,
            _ => ColorSpaceType::Unknown,
        }
    }

    fn device_class(&self) -> ProfileClass {
        match self.profile.device_class() {
            ProfileClassSignature::InputClass => ProfileClass::Input,
            ProfileClassSignature::DisplayClass => ProfileClass::Display,
            ProfileClassSignature::OutputClass => ProfileClass::Output,
            ProfileClassSignature::LinkClass => ProfileClass::Link,
            ProfileClassSignature::AbstractClass => ProfileClass::Abstract,
            ProfileClassSignature::ColorSpaceClass => ProfileClass::ColorSpace,
            ProfileClassSignature::NamedColorClass => ProfileClass::NamedColor,
            _ => ProfileClass::Unknown,
        }
    }

    fn product_description(&self) -> String {
        self.profile
            .info(InfoType::Description, Locale::none())
            .map(|s| s.trim_end_matches('\0').to_string())
            .unwrap_or_default()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl EngineBackend for Lcms2Engine {
    fn engine_id(&self) -> i32 {
        LCMS2_ENGINE_ID
    }

    fn description(&self) -> &str {
        "LittleCMS 2"
    }

    fn open_profile(&self, engine: &ColorMgmtEngine, data: &[u8], path: &str) -> Result<ColorProfile> {
        let profile = Profile::new_icc(data).map_err(|e| Error::ProfileParse(e.to_string()))?;
        Ok(ColorProfile::new(
            engine.clone(),
            Box::new(Lcms2Profile { profile }),
            path,
            profile_data_hash(data),
        ))
    }

    fn create_srgb_profile(&self, engine: &ColorMgmtEngine) -> Result<ColorProfile> {
        Ok(ColorProfile::new(
            engine.clone(),
            Box::new(Lcms2Profile {
                profile: Profile::new_srgb(),
            }),
            "",
            SRGB_ID,
        ))
    }

    fn create_lab_profile(
        &self,
        engine: &ColorMgmtEngine,
        illuminant: Illuminant,
    ) -> Result<ColorProfile> {
        let (x, y) = illuminant.white_point().chromaticity();
        let white = CIExyY { x, y, Y: 1.0 };
        let profile = Profile::new_lab4_context(GlobalContext::new(), &white)
            .map_err(|e| Error::InvalidProfile(e.to_string()))?;
        let id = match illuminant {
            Illuminant::D50 => LAB_D50_ID,
            Illuminant::D65 => LAB_D65_ID,
        };
        Ok(ColorProfile::new(
            engine.clone(),
            Box::new(Lcms2Profile { profile }),
            "",
            id,
        ))
    }

    fn create_transform(&self, request: &TransformRequest<'_>) -> Result<Box<dyn ColorTransformImpl>> {
        let input_format = native_format(request.input_format);
        let output_format = native_format(request.output_format);
        let proofing = match request.proofing {
            Some(p) => Some(&native_profile::<Lcms2Profile>(p)?.profile),
            None => None,
        };
        let params = NativeParams {
            input: &native_profile::<Lcms2Profile>(request.input)?.profile,
            input_format: pixel_format(input_format)?,
            output: &native_profile::<Lcms2Profile>(request.output)?.profile,
            output_format: pixel_format(output_format)?,
            proofing,
            intent: lcms_intent(request.render_intent, request.preserve_black()),
            proofing_intent: lcms_intent(request.proofing_intent, false),
            flags: lcms_flags(request.flags),
        };

        let native = match input_format.bytes_per_pixel() {
            1 => with_output::<[u8; 1]>(&params, output_format)?,
            2 => with_output::<[u8; 2]>(&params, output_format)?,
            3 => with_output::<[u8; 3]>(&params, output_format)?,
            4 => with_output::<[u8; 4]>(&params, output_format)?,
            6 => with_output::<[u8; 6]>(&params, output_format)?,
            8 => with_output::<[u8; 8]>(&params, output_format)?,
            24 => with_output::<[u8; 24]>(&params, output_format)?,
            _ => return Err(Error::UnsupportedFormat(request.input_format)),
        };
        Ok(Box::new(RepackTransform::new(
            request.input_format,
            request.output_format,
            native,
        )))
    }
}

/// Arguments for one native lcms2 transform
struct NativeParams<'a> {
    input: &'a Profile,
    input_format: PixelFormat,
    output: &'a Profile,
    output_format: PixelFormat,
    proofing: Option<&'a Profile>,
    intent: Intent,
    proofing_intent: Intent,
    flags: Option<Flags>,
}

fn with_output<I: Pod>(params: &NativeParams<'_>, output: ColorFormat) -> Result<Box<dyn NativeTransform>> {
    match output.bytes_per_pixel() {
        1 => build::<I, [u8; 1]>(params),
        2 => build::<I, [u8; 2]>(params),
        3 => build::<I, [u8; 3]>(params),
        4 => build::<I, [u8; 4]>(params),
        6 => build::<I, [u8; 6]>(params),
        8 => build::<I, [u8; 8]>(params),
        24 => build::<I, [u8; 24]>(params),
        _ => Err(Error::UnsupportedFormat(output)),
    }
}

fn build<I: Pod, O: Pod>(params: &NativeParams<'_>) -> Result<Box<dyn NativeTransform>> {
    let transform: Transform<I, O> = match (params.proofing, params.flags) {
        (Some(proofing), Some(flags)) => Transform::new_proofing(
            params.input,
            params.input_format,
            params.output,
            params.output_format,
            proofing,
            params.intent,
            params.proofing_intent,
            flags,
        ),
        (None, Some(flags)) => Transform::new_flags(
            params.input,
            params.input_format,
            params.output,
            params.output_format,
            params.intent,
            flags,
        ),
        (_, None) => Transform::new(
            params.input,
            params.input_format,
            params.output,
            params.output_format,
            params.intent,
        ),
    }
    .map_err(|e| Error::Transform(e.to_string()))?;
    Ok(Box::new(Lcms2Transform { transform }))
}

struct Lcms2Transform<I: Pod, O: Pod> {
    transform: Transform<I, O>,
}

impl<I: Pod, O: Pod> NativeTransform for Lcms2Transform<I, O> {
    fn run(&self, input: &[u8], output: &mut [u8], _count: usize) -> Result<()> {
        let src: &[I] = bytemuck::try_cast_slice(input)
            .map_err(|e| Error::Transform(format!("input buffer: {e:?}")))?;
        let dst: &mut [O] = bytemuck::try_cast_slice_mut(output)
            .map_err(|e| Error::Transform(format!("output buffer: {e:?}")))?;
        self.transform.transform_pixels(src, dst);
        Ok(())
    }
}

fn pixel_format(format: ColorFormat) -> Result<PixelFormat> {
    Ok(match format {
        ColorFormat::Rgb8 => PixelFormat::RGB_8,
        ColorFormat::Rgb16 => PixelFormat::RGB_16,
        ColorFormat::Rgba8 => PixelFormat::RGBA_8,
        ColorFormat::Rgba16 => PixelFormat::RGBA_16,
        ColorFormat::Cmyk8 => PixelFormat::CMYK_8,
        ColorFormat::Cmyk16 => PixelFormat::CMYK_16,
        ColorFormat::Gray8 => PixelFormat::GRAY_8,
        ColorFormat::Gray16 => PixelFormat::GRAY_16,
        ColorFormat::LabDbl => PixelFormat::Lab_DBL,
        other => return Err(Error::UnsupportedFormat(other)),
    })
}

/// Map an intent, switching to the K-plane preserving variants when asked
fn lcms_intent(intent: RenderIntent, preserve_black: bool) -> Intent {
    match (intent, preserve_black) {
        (RenderIntent::Perceptual, true) => Intent::PreserveKPlanePerceptual,
        (RenderIntent::RelativeColorimetric, true) => Intent::PreserveKPlaneRelativeColorimetric,
        (RenderIntent::Saturation, true) => Intent::PreserveKPlaneSaturation,
        (RenderIntent::Perceptual, false) => Intent::Perceptual,
        (RenderIntent::RelativeColorimetric, false) => Intent::RelativeColorimetric,
        (RenderIntent::Saturation, false) => Intent::Saturation,
        (RenderIntent::AbsoluteColorimetric, _) => Intent::AbsoluteColorimetric,
    }
}

/// Native flags for a request; `None` when no flag applies
fn lcms_flags(flags: ColorTransformFlags) -> Option<Flags> {
    [
        (ColorTransformFlags::BLACK_POINT_COMPENSATION, Flags::BLACKPOINT_COMPENSATION),
        (ColorTransformFlags::SOFTPROOFING, Flags::SOFT_PROOFING),
        (ColorTransformFlags::GAMUT_CHECK, Flags::GAMUT_CHECK),
    ]
    .into_iter()
    .filter(|(ours, _)| flags.contains(*ours))
    .map(|(_, native)| native)
    .reduce(|acc, f| acc | f)
}
