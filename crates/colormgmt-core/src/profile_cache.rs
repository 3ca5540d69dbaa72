//! Path-keyed weak cache of opened profiles
//!
//! Opening the same ICC file twice returns the same [`ColorProfile`] as long
//! as some handle to it is still alive. Like the transform pool, the cache
//! never extends a profile's lifetime.

use crate::profile::{ColorProfile, ColorProfileData};
use std::collections::HashMap;
use std::rc::Weak;

#[derive(Debug, Default)]
pub struct ColorProfileCache {
    entries: HashMap<String, Weak<ColorProfileData>>,
}

impl ColorProfileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `profile` under its path
    ///
    /// Profiles without a path (memory or built-in profiles) are not cached.
    /// Expired entries are purged on the way.
    pub fn add(&mut self, profile: &ColorProfile) {
        let path = profile.profile_path();
        if profile.is_null() || path.is_empty() {
            return;
        }
        self.entries.retain(|_, weak| weak.strong_count() > 0);
        self.entries.insert(path.to_string(), profile.weak_ref());
    }

    pub fn remove(&mut self, path: &str) {
        self.entries.remove(path);
    }

    /// Live profile opened from `path`, or a null handle
    pub fn get(&self, path: &str) -> ColorProfile {
        self.entries
            .get(path)
            .and_then(Weak::upgrade)
            .map(ColorProfile::from_data)
            .unwrap_or_default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries
            .get(path)
            .is_some_and(|weak| weak.strong_count() > 0)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
