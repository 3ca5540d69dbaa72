//! Color management engines
//!
//! A [`ColorMgmtEngine`] is a cheap, cloneable handle over one backend
//! ([`Lcms2Engine`] or [`MoxcmsEngine`]). Every engine owns exactly one
//! transform pool, one profile cache and one strategy. Profiles and
//! transforms remember the engine that created them, and objects from
//! different engines are never mixed.
//!
//! ```no_run
//! use colormgmt_core::{ColorFormat, ColorMgmtEngine, ColorTransformFlags, RenderIntent};
//!
//! let engine = ColorMgmtEngine::lcms2();
//! let srgb = engine.create_srgb_profile();
//! let cmyk = engine.open_profile_from_file("/usr/share/color/icc/ISOcoated_v2.icc")?;
//!
//! let transform = engine.create_transform(
//!     &srgb,
//!     ColorFormat::Rgb8,
//!     &cmyk,
//!     ColorFormat::Cmyk8,
//!     RenderIntent::Perceptual,
//!     engine.strategy_flags(),
//! );
//!
//! let mut cmyk_pixels = [0u8; 4];
//! if !transform.apply(&[255, 128, 64], &mut cmyk_pixels, 1) {
//!     // no usable transform, leave the data unmanaged
//! }
//! # Ok::<(), colormgmt_core::Error>(())
//! ```

mod lcms2_engine;
mod moxcms_engine;
mod repack;

pub use lcms2_engine::{LCMS2_ENGINE_ID, Lcms2Engine};
pub use moxcms_engine::{MOXCMS_ENGINE_ID, MoxcmsEngine};
pub use repack::{NativeTransform, RepackTransform, native_format};

use crate::color::{Lab, delta_e};
use crate::format::ColorFormat;
use crate::pool::ColorTransformPool;
use crate::profile::{ColorProfile, ColorProfileImpl};
use crate::profile_cache::ColorProfileCache;
use crate::structs::{
    ColorMgmtStrategy, ColorProfileInfo, ColorTransformFlags, ColorTransformInfo, ColorType,
    Illuminant, RenderIntent,
};
use crate::transform::{ColorTransform, ColorTransformImpl};
use crate::{Error, Result};
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

/// A concrete color management backend
///
/// Backends only build native objects. Caching, validation and flag
/// normalization happen in [`ColorMgmtEngine`] before a backend is asked.
pub trait EngineBackend {
    /// Stable small integer identifying the backend
    fn engine_id(&self) -> i32;

    fn description(&self) -> &str;

    /// Parse ICC data into a profile owned by `engine`
    fn open_profile(&self, engine: &ColorMgmtEngine, data: &[u8], path: &str)
    -> Result<ColorProfile>;

    fn create_srgb_profile(&self, engine: &ColorMgmtEngine) -> Result<ColorProfile>;

    fn create_lab_profile(
        &self,
        engine: &ColorMgmtEngine,
        illuminant: Illuminant,
    ) -> Result<ColorProfile>;

    /// Build the native transform for a validated request
    fn create_transform(&self, request: &TransformRequest<'_>) -> Result<Box<dyn ColorTransformImpl>>;
}

/// Validated parameters handed to [`EngineBackend::create_transform`]
///
/// Profiles are non-null and belong to the backend's engine. `proofing` is
/// set only when `flags` contains a proofing flag.
#[derive(Debug, Clone, Copy)]
pub struct TransformRequest<'a> {
    pub input: &'a ColorProfile,
    pub input_format: ColorFormat,
    pub output: &'a ColorProfile,
    pub output_format: ColorFormat,
    pub proofing: Option<&'a ColorProfile>,
    pub render_intent: RenderIntent,
    pub proofing_intent: RenderIntent,
    pub flags: ColorTransformFlags,
}

impl TransformRequest<'_> {
    /// Parameters recorded on the built transform
    pub fn info(&self) -> ColorTransformInfo {
        ColorTransformInfo {
            input_profile: self.input.data_hash().to_string(),
            output_profile: self.output.data_hash().to_string(),
            proofing_profile: self.proofing.map(|p| p.data_hash().to_string()),
            input_format: self.input_format,
            output_format: self.output_format,
            render_intent: self.render_intent,
            proofing_intent: self.proofing_intent,
            flags: self.flags,
        }
    }

    /// Whether black preservation applies (CMYK to CMYK only)
    pub fn preserve_black(&self) -> bool {
        self.flags.contains(ColorTransformFlags::BLACK_PRESERVATION)
            && self.input_format.color_type() == ColorType::Cmyk
            && self.output_format.color_type() == ColorType::Cmyk
    }
}

/// Recover a backend's own profile type from a handle
pub(crate) fn native_profile<T: ColorProfileImpl + 'static>(profile: &ColorProfile) -> Result<&T> {
    profile
        .data()
        .and_then(|d| d.imp().as_any().downcast_ref::<T>())
        .ok_or_else(|| Error::InvalidProfile("profile was not opened by this backend".into()))
}

struct EngineInner {
    backend: Box<dyn EngineBackend>,
    pool: RefCell<ColorTransformPool>,
    profiles: RefCell<ColorProfileCache>,
    strategy: Cell<ColorMgmtStrategy>,
}

/// Shared handle to a color management engine
#[derive(Clone)]
pub struct ColorMgmtEngine {
    inner: Rc<EngineInner>,
}

impl ColorMgmtEngine {
    pub fn new(backend: Box<dyn EngineBackend>) -> Self {
        let engine_id = backend.engine_id();
        Self {
            inner: Rc::new(EngineInner {
                backend,
                pool: RefCell::new(ColorTransformPool::new(engine_id)),
                profiles: RefCell::new(ColorProfileCache::new()),
                strategy: Cell::new(ColorMgmtStrategy::default()),
            }),
        }
    }

    /// Engine backed by Little CMS
    pub fn lcms2() -> Self {
        Self::new(Box::new(Lcms2Engine::new()))
    }

    /// Engine backed by moxcms
    pub fn moxcms() -> Self {
        Self::new(Box::new(MoxcmsEngine::new()))
    }

    pub fn engine_id(&self) -> i32 {
        self.inner.backend.engine_id()
    }

    pub fn description(&self) -> &str {
        self.inner.backend.description()
    }

    pub fn strategy(&self) -> ColorMgmtStrategy {
        self.inner.strategy.get()
    }

    pub fn set_strategy(&self, strategy: ColorMgmtStrategy) {
        self.inner.strategy.set(strategy);
    }

    /// Flags implied by the current strategy, to be OR-ed into requests
    pub fn strategy_flags(&self) -> ColorTransformFlags {
        self.strategy().transform_flags()
    }

    /// Shared view of the transform pool
    ///
    /// Transforms built while a guard is alive bypass the pool.
    pub fn transform_pool(&self) -> Ref<'_, ColorTransformPool> {
        self.inner.pool.borrow()
    }

    pub fn transform_pool_mut(&self) -> RefMut<'_, ColorTransformPool> {
        self.inner.pool.borrow_mut()
    }

    pub fn profile_cache(&self) -> Ref<'_, ColorProfileCache> {
        self.inner.profiles.borrow()
    }

    /// Whether both handles refer to the same engine instance
    pub fn ptr_eq(&self, other: &ColorMgmtEngine) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Open an ICC file, sharing the profile with earlier callers while alive
    pub fn open_profile_from_file(&self, path: impl AsRef<Path>) -> Result<ColorProfile> {
        let path = path.as_ref();
        let key = path.to_string_lossy();

        let cached = match self.inner.profiles.try_borrow() {
            Ok(cache) => cache.get(&key),
            Err(_) => ColorProfile::null(),
        };
        if !cached.is_null() {
            trace!(path = %key, "profile cache hit");
            return Ok(cached);
        }

        let data = std::fs::read(path)?;
        let profile = self.inner.backend.open_profile(self, &data, &key)?;
        match self.inner.profiles.try_borrow_mut() {
            Ok(mut cache) => cache.add(&profile),
            Err(_) => debug!(path = %key, "profile cache busy, not caching"),
        }
        debug!(path = %key, engine_id = self.engine_id(), "opened profile");
        Ok(profile)
    }

    /// Parse in-memory ICC data; the result is not cached
    pub fn open_profile_from_mem(&self, data: &[u8]) -> Result<ColorProfile> {
        self.inner.backend.open_profile(self, data, "")
    }

    pub(crate) fn open_profile_with_path(&self, data: &[u8], path: &str) -> Result<ColorProfile> {
        self.inner.backend.open_profile(self, data, path)
    }

    /// Built-in sRGB profile; null if the backend cannot build it
    pub fn create_srgb_profile(&self) -> ColorProfile {
        self.inner
            .backend
            .create_srgb_profile(self)
            .unwrap_or_else(|err| {
                warn!(error = %err, "failed to create sRGB profile");
                ColorProfile::null()
            })
    }

    /// Built-in Lab profile for `illuminant`; null if the backend cannot build it
    pub fn create_lab_profile(&self, illuminant: Illuminant) -> ColorProfile {
        self.inner
            .backend
            .create_lab_profile(self, illuminant)
            .unwrap_or_else(|err| {
                warn!(error = %err, ?illuminant, "failed to create Lab profile");
                ColorProfile::null()
            })
    }

    /// Describe every ICC profile under `dir`
    ///
    /// Files ending in `.icc` or `.icm` are opened one by one; those that fail
    /// are still listed with the error in `debug`. Results are sorted by path.
    pub fn available_profile_info(
        &self,
        dir: impl AsRef<Path>,
        recursive: bool,
    ) -> Vec<ColorProfileInfo> {
        let mut walker = WalkDir::new(dir.as_ref()).follow_links(true).sort_by_file_name();
        if !recursive {
            walker = walker.max_depth(1);
        }

        let mut infos = Vec::new();
        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() || !is_profile_file(entry.path()) {
                continue;
            }
            let file = entry.path().to_string_lossy().into_owned();
            let opened = std::fs::read(entry.path())
                .map_err(Error::from)
                .and_then(|data| self.inner.backend.open_profile(self, &data, &file));
            let info = match opened {
                Ok(profile) => ColorProfileInfo {
                    description: profile.product_description(),
                    color_space: profile.color_space(),
                    device_class: profile.device_class(),
                    file,
                    debug: String::new(),
                },
                Err(err) => {
                    debug!(file = %file, error = %err, "skipping unreadable profile");
                    ColorProfileInfo {
                        file,
                        debug: err.to_string(),
                        ..Default::default()
                    }
                }
            };
            infos.push(info);
        }
        infos
    }

    /// Transform from `input` to `output`; null on failure
    pub fn create_transform(
        &self,
        input: &ColorProfile,
        input_format: ColorFormat,
        output: &ColorProfile,
        output_format: ColorFormat,
        intent: RenderIntent,
        flags: ColorTransformFlags,
    ) -> ColorTransform {
        self.try_create_transform(input, input_format, output, output_format, intent, flags)
            .unwrap_or_else(|err| {
                warn!(error = %err, ?input_format, ?output_format, "failed to create transform");
                ColorTransform::null()
            })
    }

    pub fn try_create_transform(
        &self,
        input: &ColorProfile,
        input_format: ColorFormat,
        output: &ColorProfile,
        output_format: ColorFormat,
        intent: RenderIntent,
        flags: ColorTransformFlags,
    ) -> Result<ColorTransform> {
        self.build_transform(TransformRequest {
            input,
            input_format,
            output,
            output_format,
            proofing: None,
            render_intent: intent,
            proofing_intent: RenderIntent::default(),
            flags: flags - ColorTransformFlags::PROOFING,
        })
    }

    /// Transform from `input` to `output` simulating `proofing`; null on failure
    ///
    /// Without [`SOFTPROOFING`](ColorTransformFlags::SOFTPROOFING) or
    /// [`GAMUT_CHECK`](ColorTransformFlags::GAMUT_CHECK) in `flags` the
    /// proofing profile is ignored and a plain transform is returned.
    #[allow(clippy::too_many_arguments)]
    pub fn create_proofing_transform(
        &self,
        input: &ColorProfile,
        input_format: ColorFormat,
        output: &ColorProfile,
        output_format: ColorFormat,
        proofing: &ColorProfile,
        intent: RenderIntent,
        proofing_intent: RenderIntent,
        flags: ColorTransformFlags,
    ) -> ColorTransform {
        self.try_create_proofing_transform(
            input,
            input_format,
            output,
            output_format,
            proofing,
            intent,
            proofing_intent,
            flags,
        )
        .unwrap_or_else(|err| {
            warn!(error = %err, ?input_format, ?output_format, "failed to create proofing transform");
            ColorTransform::null()
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn try_create_proofing_transform(
        &self,
        input: &ColorProfile,
        input_format: ColorFormat,
        output: &ColorProfile,
        output_format: ColorFormat,
        proofing: &ColorProfile,
        intent: RenderIntent,
        proofing_intent: RenderIntent,
        flags: ColorTransformFlags,
    ) -> Result<ColorTransform> {
        if !flags.intersects(ColorTransformFlags::PROOFING) {
            return self.try_create_transform(
                input,
                input_format,
                output,
                output_format,
                intent,
                flags,
            );
        }
        self.build_transform(TransformRequest {
            input,
            input_format,
            output,
            output_format,
            proofing: Some(proofing),
            render_intent: intent,
            proofing_intent,
            flags,
        })
    }

    /// CIE76 difference between two Lab colors
    pub fn delta_e(&self, lab1: Lab, lab2: Lab) -> f64 {
        delta_e(lab1, lab2)
    }

    fn build_transform(&self, request: TransformRequest<'_>) -> Result<ColorTransform> {
        self.check_profile(request.input, Some(request.input_format))?;
        self.check_profile(request.output, Some(request.output_format))?;
        if let Some(proofing) = request.proofing {
            self.check_profile(proofing, None)?;
        }

        let info = request.info();
        let cached = match self.inner.pool.try_borrow() {
            Ok(pool) => pool.find_transform(&info),
            Err(_) => ColorTransform::null(),
        };
        if !cached.is_null() {
            debug!(
                engine_id = self.engine_id(),
                input = ?info.input_format,
                output = ?info.output_format,
                "transform cache hit"
            );
            return Ok(cached);
        }

        let imp = self.inner.backend.create_transform(&request)?;
        if imp.is_null() {
            return Err(Error::Transform("backend returned a null transform".into()));
        }
        let transform = ColorTransform::new(self.clone(), info, imp);
        match self.inner.pool.try_borrow_mut() {
            Ok(mut pool) => pool.add_transform(&transform, true),
            Err(_) => debug!(engine_id = self.engine_id(), "transform pool busy, not pooling"),
        }
        debug!(
            engine_id = self.engine_id(),
            input = ?request.input_format,
            output = ?request.output_format,
            intent = ?request.render_intent,
            proofing = request.proofing.is_some(),
            "built transform"
        );
        Ok(transform)
    }

    /// Reject null, foreign or mismatching profiles
    ///
    /// Proofing profiles carry no pixel format and pass `None`.
    fn check_profile(&self, profile: &ColorProfile, format: Option<ColorFormat>) -> Result<()> {
        let engine = profile
            .engine()
            .ok_or_else(|| Error::InvalidProfile("null profile".into()))?;
        if engine.engine_id() != self.engine_id() {
            return Err(Error::EngineMismatch {
                expected: self.engine_id(),
                actual: engine.engine_id(),
            });
        }
        let Some(format) = format else {
            return Ok(());
        };
        if !profile.color_space().accepts(format.color_type()) {
            return Err(Error::UnsupportedColorSpace(format!(
                "{:?} profile cannot carry {:?} pixels",
                profile.color_space(),
                format
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for ColorMgmtEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorMgmtEngine")
            .field("engine_id", &self.engine_id())
            .field("description", &self.description())
            .field("strategy", &self.strategy())
            .finish()
    }
}

fn is_profile_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("icc") || ext.eq_ignore_ascii_case("icm"))
}
