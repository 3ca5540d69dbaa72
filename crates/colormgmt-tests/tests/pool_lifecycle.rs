//! Transform pool lifecycle
//!
//! Sharing, expiry and engine isolation of pooled transforms, run against
//! both backends.

use colormgmt_core::{
    ColorFormat, ColorMgmtEngine, ColorTransform, ColorTransformFlags, RenderIntent,
};
use colormgmt_tests::{TestPattern, generate_pattern, init_tracing};

fn engines() -> Vec<ColorMgmtEngine> {
    init_tracing();
    vec![ColorMgmtEngine::lcms2(), ColorMgmtEngine::moxcms()]
}

fn srgb_transform(engine: &ColorMgmtEngine, intent: RenderIntent) -> ColorTransform {
    let srgb = engine.create_srgb_profile();
    engine.create_transform(
        &srgb,
        ColorFormat::Rgb8,
        &srgb,
        ColorFormat::Rgba8,
        intent,
        ColorTransformFlags::BLACK_POINT_COMPENSATION,
    )
}

#[test]
fn test_identical_requests_share() {
    eprintln!("\n=== Identical Requests Share ===\n");

    for engine in engines() {
        let a = srgb_transform(&engine, RenderIntent::Perceptual);
        let b = srgb_transform(&engine, RenderIntent::Perceptual);

        eprintln!("{}: refs={} pooled={}", engine.description(), a.ref_count(), engine.transform_pool().len());
        assert!(!a.is_null());
        assert_eq!(a, b);
        assert_eq!(a.ref_count(), 2);
        assert_eq!(engine.transform_pool().len(), 1);
    }
}

#[test]
fn test_released_transform_is_rebuilt() {
    eprintln!("\n=== Released Transform Rebuilt ===\n");

    for engine in engines() {
        let first = srgb_transform(&engine, RenderIntent::Perceptual);
        let info = first.transform_info().cloned().unwrap();
        drop(first);

        assert!(engine.transform_pool().find_transform(&info).is_null());
        assert_eq!(engine.transform_pool().live_count(), 0);

        let second = srgb_transform(&engine, RenderIntent::Perceptual);
        assert!(!second.is_null());
        assert_eq!(second.ref_count(), 1);
        assert_eq!(engine.transform_pool().find_transform(&info), second);

        // The expired entry lingers until swept
        assert_eq!(engine.transform_pool().len(), 2);
        engine.transform_pool_mut().remove_transform_info(&info);
        assert!(engine.transform_pool().is_empty());
        assert!(!second.is_null());
    }
}

#[test]
fn test_distinct_parameters_are_distinct() {
    for engine in engines() {
        let perceptual = srgb_transform(&engine, RenderIntent::Perceptual);
        let relative = srgb_transform(&engine, RenderIntent::RelativeColorimetric);
        assert_ne!(perceptual, relative);

        let srgb = engine.create_srgb_profile();
        let bgra = engine.create_transform(
            &srgb,
            ColorFormat::Rgb8,
            &srgb,
            ColorFormat::Bgra8,
            RenderIntent::Perceptual,
            ColorTransformFlags::BLACK_POINT_COMPENSATION,
        );
        assert_ne!(perceptual, bgra);
        assert_eq!(engine.transform_pool().live_count(), 3);
    }
}

#[test]
fn test_removed_transform_is_not_shared() {
    for engine in engines() {
        let kept = srgb_transform(&engine, RenderIntent::Saturation);
        engine.transform_pool_mut().remove_transform(&kept);
        assert!(engine.transform_pool().is_empty());

        let fresh = srgb_transform(&engine, RenderIntent::Saturation);
        assert_ne!(kept, fresh);
        assert_eq!(kept.transform_info(), fresh.transform_info());
    }
}

#[test]
fn test_clear_keeps_handles_usable() {
    for engine in engines() {
        let transform = srgb_transform(&engine, RenderIntent::Perceptual);
        engine.transform_pool_mut().clear();
        assert!(engine.transform_pool().is_empty());

        let rgb = generate_pattern(TestPattern::White, 4);
        let mut rgba = vec![0u8; 16];
        assert!(transform.apply(&rgb, &mut rgba, 4));
        for pixel in rgba.chunks_exact(4) {
            assert_eq!(pixel[3], 255, "{}: missing opaque alpha", engine.description());
            assert!(pixel[..3].iter().all(|&v| v >= 254), "{pixel:?}");
        }
    }
}

#[test]
fn test_foreign_transform_is_ignored() {
    eprintln!("\n=== Foreign Transform Ignored ===\n");

    let lcms = ColorMgmtEngine::lcms2();
    let mox = ColorMgmtEngine::moxcms();
    let foreign = srgb_transform(&lcms, RenderIntent::Perceptual);
    let info = foreign.transform_info().cloned().unwrap();

    mox.transform_pool_mut().add_transform(&foreign, true);
    assert!(mox.transform_pool().is_empty());
    assert!(mox.transform_pool().find_transform(&info).is_null());

    lcms.transform_pool_mut().remove_transform(&ColorTransform::null());
    mox.transform_pool_mut().remove_transform(&foreign);
    assert_eq!(lcms.transform_pool().len(), 1);
}

#[test]
fn test_forced_duplicate_keeps_first() {
    for engine in engines() {
        let first = srgb_transform(&engine, RenderIntent::AbsoluteColorimetric);
        let info = first.transform_info().cloned().unwrap();

        engine.transform_pool_mut().add_transform(&first, false);
        assert_eq!(engine.transform_pool().len(), 1);

        engine.transform_pool_mut().add_transform(&first, true);
        assert_eq!(engine.transform_pool().len(), 2);
        assert_eq!(engine.transform_pool().find_transform(&info), first);
    }
}

#[test]
fn test_engine_outlives_caller_handle() {
    let transform = {
        let engine = ColorMgmtEngine::moxcms();
        srgb_transform(&engine, RenderIntent::Perceptual)
    };
    let engine = transform.engine().cloned().unwrap();
    assert_eq!(engine.transform_pool().find_transform(transform.transform_info().unwrap()), transform);

    let rgb = generate_pattern(TestPattern::ColorCube, 8);
    let mut out = Vec::new();
    assert!(transform.apply_vec(&rgb, &mut out, 8));
    assert_eq!(out.len(), 32);
}
