//! # colormgmt - color management core
//!
//! Engine-neutral color management for page layout and raster pipelines:
//! pixel format descriptors, per-format channel layout adapters, shared
//! transform handles and a weak transform pool, on top of two
//! interchangeable backends.
//!
//! ## Backends
//!
//! - [`Lcms2Engine`]: Little CMS through the `lcms2` crate
//! - [`MoxcmsEngine`]: pure Rust, through `moxcms`
//!
//! Each engine has a stable id. Profiles and transforms remember the engine
//! that built them, and an engine's pool silently ignores objects from any
//! other engine.
//!
//! ## Quick Start
//!
//! ```no_run
//! use colormgmt_core::{ColorFormat, ColorMgmtEngine, RenderIntent};
//!
//! let engine = ColorMgmtEngine::moxcms();
//! let srgb = engine.create_srgb_profile();
//! let printer = engine.open_profile_from_file("coated.icc")?;
//!
//! let transform = engine.create_transform(
//!     &srgb,
//!     ColorFormat::Bgra8,
//!     &printer,
//!     ColorFormat::Cmyk8,
//!     RenderIntent::RelativeColorimetric,
//!     engine.strategy_flags(),
//! );
//!
//! let bgra = [64u8, 128, 255, 255];
//! let mut cmyk = [0u8; 4];
//! transform.apply(&bgra, &mut cmyk, 1);
//! # Ok::<(), colormgmt_core::Error>(())
//! ```
//!
//! Identical requests share one native transform for as long as any handle
//! to it is alive:
//!
//! ```
//! use colormgmt_core::{ColorFormat, ColorMgmtEngine, ColorTransformFlags, RenderIntent};
//!
//! let engine = ColorMgmtEngine::lcms2();
//! let srgb = engine.create_srgb_profile();
//! let build = || {
//!     engine.create_transform(
//!         &srgb,
//!         ColorFormat::Rgb8,
//!         &srgb,
//!         ColorFormat::Rgba8,
//!         RenderIntent::Perceptual,
//!         ColorTransformFlags::BLACK_POINT_COMPENSATION,
//!     )
//! };
//! assert_eq!(build(), build());
//! ```
//!
//! Nothing here is thread-safe: handles are `Rc` based and an engine and
//! everything it creates must stay on one thread.

pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod pool;
pub mod profile;
pub mod profile_cache;
pub mod space_data;
pub mod structs;
pub mod transform;

pub use color::{Lab, WhitePoint, Xyz, delta_e, delta_e_2000};
pub use config::{ColorMgmtConfig, EngineKind};
pub use engine::{
    ColorMgmtEngine, EngineBackend, LCMS2_ENGINE_ID, Lcms2Engine, MOXCMS_ENGINE_ID, MoxcmsEngine,
    TransformRequest,
};
pub use error::{Error, Result};
pub use format::{
    ColorFormat, color_format_bytes_per_channel, color_format_has_alpha,
    color_format_num_channels, color_format_type,
};
pub use pool::ColorTransformPool;
pub use profile::{ColorProfile, ColorProfileData, ColorProfileImpl};
pub use profile_cache::ColorProfileCache;
pub use space_data::{ChannelMap, ColorSpaceData};
pub use structs::{
    ColorMgmtStrategy, ColorProfileInfo, ColorSpaceType, ColorTransformFlags, ColorTransformInfo,
    ColorType, Illuminant, Observer, ProfileClass, RenderIntent,
};
pub use transform::{ColorTransform, ColorTransformData, ColorTransformImpl};

/// Version of colormgmt
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
