//! ICC color profile handles
//!
//! A [`ColorProfile`] is a cheap, cloneable handle to a profile opened by
//! one engine. The parsed profile itself lives behind the engine-specific
//! [`ColorProfileImpl`]; the color core only reads its declared color space,
//! device class and description.

use crate::engine::ColorMgmtEngine;
use crate::structs::{ColorSpaceType, ProfileClass};
use sha2::{Digest, Sha256};
use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};

/// Engine-side representation of an opened profile
pub trait ColorProfileImpl {
    /// Color space declared in the profile header
    fn color_space(&self) -> ColorSpaceType;

    /// Device class declared in the profile header
    fn device_class(&self) -> ProfileClass;

    /// Human readable description, empty if the profile has none
    fn product_description(&self) -> String;

    /// Downcast hook so an engine can recover its native profile
    fn as_any(&self) -> &dyn Any;
}

/// Backing store shared by all handles to one opened profile
pub struct ColorProfileData {
    engine: ColorMgmtEngine,
    path: String,
    data_hash: String,
    imp: Box<dyn ColorProfileImpl>,
}

impl ColorProfileData {
    pub fn engine(&self) -> &ColorMgmtEngine {
        &self.engine
    }

    pub fn imp(&self) -> &dyn ColorProfileImpl {
        self.imp.as_ref()
    }
}

/// Shared handle to an opened ICC profile; may be null
#[derive(Clone, Default)]
pub struct ColorProfile {
    data: Option<Rc<ColorProfileData>>,
}

impl ColorProfile {
    /// A handle that refers to no profile
    pub fn null() -> Self {
        Self { data: None }
    }

    /// Wrap an engine-specific profile
    ///
    /// `path` is empty for profiles that were not read from disk; `data_hash`
    /// is the identifier recorded in transform parameters.
    pub fn new(
        engine: ColorMgmtEngine,
        imp: Box<dyn ColorProfileImpl>,
        path: impl Into<String>,
        data_hash: impl Into<String>,
    ) -> Self {
        Self {
            data: Some(Rc::new(ColorProfileData {
                engine,
                path: path.into(),
                data_hash: data_hash.into(),
                imp,
            })),
        }
    }

    pub(crate) fn from_data(data: Rc<ColorProfileData>) -> Self {
        Self { data: Some(data) }
    }

    pub fn is_null(&self) -> bool {
        self.data.is_none()
    }

    /// Declared color space; `Unknown` for a null handle
    pub fn color_space(&self) -> ColorSpaceType {
        self.data
            .as_ref()
            .map(|d| d.imp.color_space())
            .unwrap_or_default()
    }

    /// Declared device class; `Unknown` for a null handle
    pub fn device_class(&self) -> ProfileClass {
        self.data
            .as_ref()
            .map(|d| d.imp.device_class())
            .unwrap_or_default()
    }

    pub fn product_description(&self) -> String {
        self.data
            .as_ref()
            .map(|d| d.imp.product_description())
            .unwrap_or_default()
    }

    /// File the profile was read from, empty for memory profiles
    pub fn profile_path(&self) -> &str {
        self.data.as_ref().map(|d| d.path.as_str()).unwrap_or("")
    }

    /// Identifier used in [`ColorTransformInfo`](crate::ColorTransformInfo)
    pub fn data_hash(&self) -> &str {
        self.data.as_ref().map(|d| d.data_hash.as_str()).unwrap_or("")
    }

    /// Engine that opened the profile
    pub fn engine(&self) -> Option<&ColorMgmtEngine> {
        self.data.as_ref().map(|d| &d.engine)
    }

    pub fn data(&self) -> Option<&Rc<ColorProfileData>> {
        self.data.as_ref()
    }

    pub fn weak_ref(&self) -> Weak<ColorProfileData> {
        self.data.as_ref().map(Rc::downgrade).unwrap_or_default()
    }

    /// Whether the profile can act as a conversion destination
    pub fn is_suitable_for_output(&self) -> bool {
        matches!(
            self.device_class(),
            ProfileClass::Output | ProfileClass::Display | ProfileClass::ColorSpace
        ) && matches!(
            self.color_space(),
            ColorSpaceType::Rgb | ColorSpaceType::Cmyk | ColorSpaceType::Gray
        )
    }

    /// Whether both handles refer to the same opened profile
    pub fn ptr_eq(&self, other: &ColorProfile) -> bool {
        match (&self.data, &other.data) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for ColorProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            None => f.write_str("ColorProfile(null)"),
            Some(data) => f
                .debug_struct("ColorProfile")
                .field("engine", &data.engine.engine_id())
                .field("path", &data.path)
                .field("data_hash", &data.data_hash)
                .field("color_space", &data.imp.color_space())
                .finish(),
        }
    }
}

/// Hex SHA-256 of raw ICC data, used as the profile identifier
pub fn profile_data_hash(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}
