//! Fixture discovery and scratch space
//!
//! `testdata/profiles/press-cmyk.icc` is a small synthetic press profile
//! (regenerate with `make_press_cmyk.py` next to it). CMYK suites prefer a
//! profile named by `COLORMGMT_CMYK_PROFILE`, then anything under
//! `testdata/profiles`, then the system color directories.

use colormgmt_core::{ColorMgmtEngine, ColorProfile, ColorSpaceType};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::EnvFilter;

/// Environment variable naming a CMYK output profile
pub const CMYK_PROFILE_ENV: &str = "COLORMGMT_CMYK_PROFILE";

const SYSTEM_PROFILE_DIRS: &[&str] = &["/usr/share/color/icc", "/usr/local/share/color/icc"];

/// Route `tracing` output to the test harness, filtered by `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn testdata_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("testdata")
}

/// Path of the bundled synthetic CMYK press profile
pub fn press_cmyk_path() -> PathBuf {
    testdata_dir().join("profiles").join("press-cmyk.icc")
}

/// Open the bundled CMYK press profile through `engine`
pub fn press_cmyk_profile(engine: &ColorMgmtEngine) -> colormgmt_core::Result<ColorProfile> {
    engine.open_profile_from_file(press_cmyk_path())
}

/// Candidate directories for profile fixtures, in search order
pub fn profile_dirs() -> Vec<PathBuf> {
    std::iter::once(testdata_dir().join("profiles"))
        .chain(SYSTEM_PROFILE_DIRS.iter().map(PathBuf::from))
        .filter(|dir| dir.is_dir())
        .collect()
}

/// Open the first CMYK profile available to `engine`, if any
pub fn find_cmyk_profile(engine: &ColorMgmtEngine) -> Option<ColorProfile> {
    if let Ok(path) = std::env::var(CMYK_PROFILE_ENV) {
        match engine.open_profile_from_file(&path) {
            Ok(profile) if profile.color_space() == ColorSpaceType::Cmyk => return Some(profile),
            Ok(_) => eprintln!("{CMYK_PROFILE_ENV}={path} is not a CMYK profile"),
            Err(e) => eprintln!("{CMYK_PROFILE_ENV}={path}: {e}"),
        }
    }

    profile_dirs()
        .iter()
        .flat_map(|dir| engine.available_profile_info(dir, true))
        .filter(|info| info.debug.is_empty() && info.color_space == ColorSpaceType::Cmyk)
        .find_map(|info| engine.open_profile_from_file(&info.file).ok())
}

/// Temporary directory removed on drop
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn new(label: &str) -> std::io::Result<Self> {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let path = std::env::temp_dir().join(format!(
            "colormgmt-{label}-{}-{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `data` to `name` (which may contain subdirectories)
    pub fn write(&self, name: &str, data: &[u8]) -> std::io::Result<PathBuf> {
        let file = self.path.join(name);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&file, data)?;
        Ok(file)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}
