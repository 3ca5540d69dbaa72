//! Profile directory scanning and the path cache

use colormgmt_core::{
    ColorFormat, ColorMgmtConfig, ColorMgmtEngine, ColorProfile, ColorSpaceType, ColorTransformFlags,
    EngineKind, Error, ProfileClass, RenderIntent,
};
use colormgmt_tests::{ScratchDir, init_tracing};
use std::collections::BTreeSet;
use std::path::Path;

fn srgb_icc() -> Vec<u8> {
    lcms2::Profile::new_srgb().icc().unwrap()
}

/// Scratch tree with two valid profiles, a corrupt one, a nested one and noise
fn profile_tree() -> ScratchDir {
    init_tracing();
    let dir = ScratchDir::new("profile-scan").unwrap();
    dir.write("srgb.icc", &srgb_icc()).unwrap();
    dir.write("SRGB_COPY.ICM", &srgb_icc()).unwrap();
    dir.write("broken.icc", b"definitely not an ICC profile").unwrap();
    dir.write("readme.txt", &srgb_icc()).unwrap();
    dir.write("nested/deeper/srgb2.icc", &srgb_icc()).unwrap();
    dir
}

fn file_names(infos: &[colormgmt_core::ColorProfileInfo]) -> BTreeSet<String> {
    infos
        .iter()
        .filter_map(|info| Path::new(&info.file).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_scan_non_recursive() {
    eprintln!("\n=== Non-recursive Scan ===\n");

    let dir = profile_tree();
    for engine in [ColorMgmtEngine::lcms2(), ColorMgmtEngine::moxcms()] {
        let infos = engine.available_profile_info(dir.path(), false);
        for info in &infos {
            eprintln!("{}: {} {:?} {:?} {}", engine.description(), info.file, info.color_space, info.description, info.debug);
        }

        let expected: BTreeSet<String> = ["SRGB_COPY.ICM", "broken.icc", "srgb.icc"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(file_names(&infos), expected);

        for info in &infos {
            if info.file.ends_with("broken.icc") {
                assert!(!info.debug.is_empty());
                assert_eq!(info.color_space, ColorSpaceType::Unknown);
            } else {
                assert!(info.debug.is_empty(), "{}: {}", info.file, info.debug);
                assert_eq!(info.color_space, ColorSpaceType::Rgb);
                assert_eq!(info.device_class, ProfileClass::Display);
            }
        }
    }
}

#[test]
fn test_scan_recursive() {
    let dir = profile_tree();
    let engine = ColorMgmtEngine::lcms2();

    let infos = engine.available_profile_info(dir.path(), true);
    assert_eq!(infos.len(), 4);
    assert!(file_names(&infos).contains("srgb2.icc"));
    assert!(infos.iter().all(|info| !info.file.ends_with(".txt")));
}

#[test]
fn test_scan_missing_dir_is_empty() {
    let engine = ColorMgmtEngine::moxcms();
    assert!(engine.available_profile_info("/nonexistent/colormgmt", true).is_empty());
}

#[test]
fn test_config_scans_every_dir() {
    let first = profile_tree();
    let second = ScratchDir::new("profile-scan-second").unwrap();
    second.write("only.icm", &srgb_icc()).unwrap();

    let config = ColorMgmtConfig {
        engine: EngineKind::Moxcms,
        profile_dirs: vec![first.path().to_path_buf(), second.path().to_path_buf()],
        recursive_scan: false,
        ..Default::default()
    };
    let engine = config.build_engine();
    let infos = config.scan_profiles(&engine);
    assert_eq!(infos.len(), 4);
    assert!(infos.last().unwrap().file.ends_with("only.icm"));
}

#[test]
fn test_open_from_file_is_cached_while_alive() {
    let dir = profile_tree();
    let path = dir.path().join("srgb.icc");
    let engine = ColorMgmtEngine::lcms2();

    let first = engine.open_profile_from_file(&path).unwrap();
    let second = engine.open_profile_from_file(&path).unwrap();
    assert!(first.ptr_eq(&second));
    assert_eq!(first.profile_path(), path.to_string_lossy());
    assert!(engine.profile_cache().contains(first.profile_path()));

    let hash = first.data_hash().to_string();
    drop(first);
    drop(second);
    assert!(!engine.profile_cache().contains(&path.to_string_lossy()));

    let reopened = engine.open_profile_from_file(&path).unwrap();
    assert_eq!(reopened.data_hash(), hash);
}

#[test]
fn test_open_errors() {
    let dir = profile_tree();
    let engine = ColorMgmtEngine::moxcms();

    let err = engine.open_profile_from_file(dir.path().join("missing.icc")).unwrap_err();
    assert!(matches!(err, Error::Io(_)), "{err}");

    let err = engine.open_profile_from_file(dir.path().join("broken.icc")).unwrap_err();
    assert!(matches!(err, Error::ProfileParse(_)), "{err}");
    assert!(engine.profile_cache().is_empty());
}

#[test]
fn test_identical_data_shares_transforms() {
    let dir = profile_tree();
    for engine in [ColorMgmtEngine::lcms2(), ColorMgmtEngine::moxcms()] {
        let a = engine.open_profile_from_file(dir.path().join("srgb.icc")).unwrap();
        let b = engine.open_profile_from_file(dir.path().join("SRGB_COPY.ICM")).unwrap();
        assert!(!a.ptr_eq(&b));
        assert_eq!(a.data_hash(), b.data_hash());

        let build = |input: &ColorProfile, output: &ColorProfile| {
            engine.create_transform(
                input,
                ColorFormat::Rgb16,
                output,
                ColorFormat::Rgb16,
                RenderIntent::RelativeColorimetric,
                ColorTransformFlags::empty(),
            )
        };
        let t1 = build(&a, &a);
        let t2 = build(&b, &b);
        assert!(!t1.is_null());
        assert_eq!(t1, t2, "{}", engine.description());
    }
}
