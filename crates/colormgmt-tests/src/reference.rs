//! Reference transforms built directly on `lcms2` and `moxcms`
//!
//! These bypass the engine layer (no pool, no repacking) so integration
//! tests can check the engines against the libraries they wrap.

use anyhow::{Context, Result, anyhow};
use colormgmt_core::Lab;
use lcms2::{CIExyY, GlobalContext, Intent, PixelFormat, Profile, Transform};

/// D50 white in xyY, the ICC PCS white
const D50_XYY: CIExyY = CIExyY {
    x: 0.3457,
    y: 0.3585,
    Y: 1.0,
};

/// sRGB pixels to D50 Lab with plain lcms2
pub fn lcms2_srgb_to_lab(rgb: &[u8]) -> Result<Vec<Lab>> {
    let srgb = Profile::new_srgb();
    let lab = Profile::new_lab4_context(GlobalContext::new(), &D50_XYY)
        .map_err(|e| anyhow!("lcms2 lab profile: {e}"))?;
    let transform: Transform<[u8; 3], [f64; 3]> = Transform::new(
        &srgb,
        PixelFormat::RGB_8,
        &lab,
        PixelFormat::Lab_DBL,
        Intent::Perceptual,
    )
    .map_err(|e| anyhow!("lcms2 transform: {e}"))?;

    let src: Vec<[u8; 3]> = rgb.chunks_exact(3).map(|p| [p[0], p[1], p[2]]).collect();
    let mut dst = vec![[0.0f64; 3]; src.len()];
    transform.transform_pixels(&src, &mut dst);
    Ok(dst.into_iter().map(|[l, a, b]| Lab::new(l, a, b)).collect())
}

/// sRGB pixels to CMYK through an ICC profile with plain lcms2
pub fn lcms2_srgb_to_cmyk(cmyk_icc: &[u8], rgb: &[u8], intent: Intent) -> Result<Vec<u8>> {
    let srgb = Profile::new_srgb();
    let cmyk = Profile::new_icc(cmyk_icc).map_err(|e| anyhow!("lcms2 cmyk profile: {e}"))?;
    let transform: Transform<[u8; 3], [u8; 4]> =
        Transform::new(&srgb, PixelFormat::RGB_8, &cmyk, PixelFormat::CMYK_8, intent)
            .map_err(|e| anyhow!("lcms2 transform: {e}"))?;

    let src: Vec<[u8; 3]> = rgb.chunks_exact(3).map(|p| [p[0], p[1], p[2]]).collect();
    let mut dst = vec![[0u8; 4]; src.len()];
    transform.transform_pixels(&src, &mut dst);
    Ok(dst.concat())
}

/// sRGB to sRGB with plain moxcms, 8-bit RGB
pub fn moxcms_srgb_identity(rgb: &[u8]) -> Result<Vec<u8>> {
    use moxcms::{ColorProfile, Layout, TransformOptions};

    let srgb = ColorProfile::new_srgb();
    let transform = srgb
        .create_transform_8bit(Layout::Rgb, &srgb, Layout::Rgb, TransformOptions::default())
        .map_err(|e| anyhow!("moxcms transform: {e:?}"))?;

    let mut dst = vec![0u8; rgb.len()];
    transform
        .transform(rgb, &mut dst)
        .map_err(|e| anyhow!("moxcms execute: {e:?}"))
        .context("sRGB identity")?;
    Ok(dst)
}
