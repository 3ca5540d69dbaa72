//! CMYK Transform Tests
//!
//! Run against the bundled synthetic press profile unless
//! `COLORMGMT_CMYK_PROFILE` names another one (see `colormgmt_tests::fixtures`).

use colormgmt_core::{
    ColorFormat, ColorMgmtEngine, ColorProfile, ColorTransformFlags, LCMS2_ENGINE_ID,
    RenderIntent,
};
use colormgmt_tests::patterns::{alpha_at, sizes};
use colormgmt_tests::reference::lcms2_srgb_to_cmyk;
use colormgmt_tests::{
    TestPattern, find_cmyk_profile, generate_pattern, init_tracing, pack_rgb8, press_cmyk_profile,
};

/// Each engine paired with a CMYK profile it opened
fn engines_with_cmyk() -> Vec<(ColorMgmtEngine, ColorProfile)> {
    init_tracing();
    [ColorMgmtEngine::lcms2(), ColorMgmtEngine::moxcms()]
        .into_iter()
        .filter_map(|engine| match find_cmyk_profile(&engine) {
            Some(profile) => Some((engine, profile)),
            None => {
                eprintln!("SKIP: {} (no CMYK profile found)", engine.description());
                None
            }
        })
        .collect()
}

fn to_cmyk(
    engine: &ColorMgmtEngine,
    cmyk: &ColorProfile,
    input_format: ColorFormat,
    input: &[u8],
    output_format: ColorFormat,
    count: usize,
) -> Vec<u8> {
    let srgb = engine.create_srgb_profile();
    let transform = engine.create_transform(
        &srgb,
        input_format,
        cmyk,
        output_format,
        RenderIntent::Perceptual,
        ColorTransformFlags::empty(),
    );
    assert!(!transform.is_null(), "{}: {input_format:?} -> {output_format:?}", engine.description());
    let mut output = vec![0u8; count * output_format.bytes_per_pixel()];
    assert!(transform.apply(input, &mut output, count));
    output
}

#[test]
fn test_rgb_to_cmyk_with_bpc_is_pooled() {
    eprintln!("\n=== RGB8 -> CMYK8 (BPC, pooled) ===\n");
    init_tracing();

    for engine in [ColorMgmtEngine::lcms2(), ColorMgmtEngine::moxcms()] {
        let srgb = engine.create_srgb_profile();
        let press = press_cmyk_profile(&engine).unwrap();
        let build = || {
            engine.create_transform(
                &srgb,
                ColorFormat::Rgb8,
                &press,
                ColorFormat::Cmyk8,
                RenderIntent::RelativeColorimetric,
                ColorTransformFlags::BLACK_POINT_COMPENSATION,
            )
        };

        let first = build();
        assert!(!first.is_null(), "{}", engine.description());
        let second = build();
        assert_eq!(first, second, "{}", engine.description());
        assert_eq!(first.ref_count(), 2);
        assert_eq!(engine.transform_pool().len(), 1);

        let mut out = [0u8; 8];
        assert!(second.apply(&[255, 255, 255, 0, 0, 0], &mut out, 2));
        eprintln!("{}: white -> {:?}, black -> {:?}", engine.description(), &out[..4], &out[4..]);
        assert!(out[..4].iter().all(|&v| v <= 3), "{}: paper {out:?}", engine.description());
        assert!(out[7] >= 200, "{}: black {out:?}", engine.description());

        let info = first.transform_info().cloned().unwrap();
        drop(first);
        drop(second);
        assert!(engine.transform_pool().find_transform(&info).is_null());
        let rebuilt = build();
        assert!(!rebuilt.is_null());
        assert_eq!(engine.transform_pool().find_transform(&info), rebuilt);
    }
}

#[test]
fn test_cmyk_profile_metadata() {
    eprintln!("\n=== CMYK Profile Metadata ===\n");

    for (engine, cmyk) in engines_with_cmyk() {
        eprintln!(
            "{}: {} ({:?}, {:?})",
            engine.description(),
            cmyk.profile_path(),
            cmyk.device_class(),
            cmyk.product_description()
        );
        assert!(!cmyk.profile_path().is_empty());
        assert_eq!(cmyk.data_hash().len(), 64);
        assert!(engine.profile_cache().contains(cmyk.profile_path()));
    }
}

#[test]
fn test_lcms2_engine_matches_lcms2() {
    eprintln!("\n=== sRGB -> CMYK vs lcms2 ===\n");

    for (engine, cmyk) in engines_with_cmyk() {
        if engine.engine_id() != LCMS2_ENGINE_ID {
            continue;
        }
        let data = match std::fs::read(cmyk.profile_path()) {
            Ok(d) => d,
            Err(_) => {
                eprintln!("SKIP: {} (read error)", cmyk.profile_path());
                continue;
            }
        };

        let rgb = generate_pattern(TestPattern::Random(11), sizes::SMALL);
        let ours = to_cmyk(&engine, &cmyk, ColorFormat::Rgb8, &rgb, ColorFormat::Cmyk8, sizes::SMALL);
        let reference = lcms2_srgb_to_cmyk(&data, &rgb, lcms2::Intent::Perceptual).unwrap();
        assert_eq!(ours, reference);
    }
}

#[test]
fn test_cmyk_channel_orders() {
    eprintln!("\n=== CMYK / YMCK / CMYKA ===\n");

    for (engine, cmyk) in engines_with_cmyk() {
        let rgb = generate_pattern(TestPattern::HueRamp, sizes::TINY);
        let count = sizes::TINY;

        let plain = to_cmyk(&engine, &cmyk, ColorFormat::Rgb8, &rgb, ColorFormat::Cmyk8, count);
        let ymck = to_cmyk(&engine, &cmyk, ColorFormat::Rgb8, &rgb, ColorFormat::Ymck8, count);
        let with_alpha = to_cmyk(&engine, &cmyk, ColorFormat::Rgb8, &rgb, ColorFormat::Cmyka8, count);

        for i in 0..count {
            let c = &plain[i * 4..i * 4 + 4];
            let y = &ymck[i * 4..i * 4 + 4];
            let a = &with_alpha[i * 5..i * 5 + 5];
            assert_eq!([y[2], y[1], y[0], y[3]], [c[0], c[1], c[2], c[3]], "pixel {i}");
            assert_eq!(&a[..4], c, "pixel {i}");
            assert_eq!(a[4], 255, "pixel {i}: CMYKA from RGB must be opaque");
        }
        eprintln!("{}: {} pixels consistent", engine.description(), count);
    }
}

#[test]
fn test_rgba_to_cmyka_carries_alpha() {
    for (engine, cmyk) in engines_with_cmyk() {
        let rgb = generate_pattern(TestPattern::SkinTones, sizes::TINY);
        let bgra = pack_rgb8(&rgb, ColorFormat::Bgra8).unwrap();
        let out = to_cmyk(&engine, &cmyk, ColorFormat::Bgra8, &bgra, ColorFormat::Cmyka16, sizes::TINY);

        for (i, pixel) in out.chunks_exact(10).enumerate() {
            let alpha = u16::from_ne_bytes([pixel[8], pixel[9]]);
            assert_eq!(alpha, u16::from(alpha_at(i)) * 257, "{} pixel {i}", engine.description());
        }
    }
}

#[test]
fn test_paper_white_to_srgb() {
    for (engine, cmyk) in engines_with_cmyk() {
        let srgb = engine.create_srgb_profile();
        let transform = engine.create_transform(
            &cmyk,
            ColorFormat::Cmyk8,
            &srgb,
            ColorFormat::Rgb8,
            RenderIntent::RelativeColorimetric,
            ColorTransformFlags::empty(),
        );
        assert!(!transform.is_null());

        let mut out = [0u8; 3];
        assert!(transform.apply(&[0, 0, 0, 0], &mut out, 1));
        eprintln!("{}: paper white -> {out:?}", engine.description());
        assert!(out.iter().all(|&v| v >= 245), "{out:?}");
    }
}

#[test]
fn test_black_preservation_keeps_pure_k() {
    eprintln!("\n=== Black Preservation ===\n");

    for (engine, cmyk) in engines_with_cmyk() {
        if engine.engine_id() != LCMS2_ENGINE_ID {
            eprintln!("SKIP: {} (no black preservation)", engine.description());
            continue;
        }
        let transform = engine.create_transform(
            &cmyk,
            ColorFormat::Cmyk8,
            &cmyk,
            ColorFormat::Cmyk8,
            RenderIntent::Perceptual,
            ColorTransformFlags::BLACK_PRESERVATION,
        );
        assert!(!transform.is_null());

        let input = [0u8, 0, 0, 255, 0, 0, 0, 128];
        let mut out = [0u8; 8];
        assert!(transform.apply(&input, &mut out, 2));
        eprintln!("K100 -> {:?}, K50 -> {:?}", &out[..4], &out[4..]);
        assert!(out[..3].iter().all(|&v| v <= 2), "{out:?}");
        assert!(out[3] >= 200, "{out:?}");
        assert!(out[4..7].iter().all(|&v| v <= 2), "{out:?}");
    }
}
