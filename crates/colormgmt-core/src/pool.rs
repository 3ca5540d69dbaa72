//! Weak cache of built transforms
//!
//! The pool remembers transforms an engine has built so an identical request
//! can share the existing native object. It never owns them: entries are weak
//! references and may expire at any time once the last [`ColorTransform`]
//! handle is dropped. A lookup that finds nothing is the normal signal to
//! build the transform again.

use crate::structs::ColorTransformInfo;
use crate::transform::{ColorTransform, ColorTransformData};
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

/// Engine-scoped collection of weak transform references
#[derive(Debug, Default)]
pub struct ColorTransformPool {
    engine_id: i32,
    entries: Vec<Weak<ColorTransformData>>,
}

impl ColorTransformPool {
    /// Empty pool accepting transforms built by engine `engine_id`
    pub fn new(engine_id: i32) -> Self {
        Self {
            engine_id,
            entries: Vec::new(),
        }
    }

    pub fn engine_id(&self) -> i32 {
        self.engine_id
    }

    /// Number of entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries whose transform is still alive
    pub fn live_count(&self) -> usize {
        self.entries.iter().filter(|e| e.strong_count() > 0).count()
    }

    /// Forget every entry; transforms held elsewhere stay alive
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Remember `transform`
    ///
    /// Ignored for null handles and for transforms built by another engine.
    /// Unless `force` is set, a transform whose parameters are already pooled
    /// is not added a second time.
    pub fn add_transform(&mut self, transform: &ColorTransform, force: bool) {
        let Some(info) = self.accepted_info(transform) else {
            return;
        };
        if !force && !self.find_transform(info).is_null() {
            trace!(engine_id = self.engine_id, "transform already pooled");
            return;
        }
        self.entries.push(transform.weak_ref());
    }

    /// Forget the entry sharing `transform`'s backing data
    ///
    /// Matching is by identity, not by parameters. Ignored for null handles
    /// and for transforms built by another engine.
    pub fn remove_transform(&mut self, transform: &ColorTransform) {
        if self.accepted_info(transform).is_none() {
            return;
        }
        let Some(data) = transform.strong_ref() else {
            return;
        };
        if let Some(pos) = self
            .entries
            .iter()
            .position(|e| e.upgrade().is_some_and(|d| Rc::ptr_eq(&d, &data)))
        {
            self.entries.remove(pos);
        }
    }

    /// Forget every entry built from `info`, and every expired entry
    pub fn remove_transform_info(&mut self, info: &ColorTransformInfo) {
        let before = self.entries.len();
        self.entries.retain(|e| match e.upgrade() {
            Some(data) => data.transform_info() != info,
            None => false,
        });
        trace!(
            engine_id = self.engine_id,
            removed = before - self.entries.len(),
            "swept transform pool"
        );
    }

    /// First live transform built from `info`, or a null handle
    pub fn find_transform(&self, info: &ColorTransformInfo) -> ColorTransform {
        self.entries
            .iter()
            .filter_map(Weak::upgrade)
            .find(|data| data.transform_info() == info)
            .map(ColorTransform::from_data)
            .unwrap_or_default()
    }

    /// Parameters of `transform` if this pool may hold it
    fn accepted_info<'a>(&self, transform: &'a ColorTransform) -> Option<&'a ColorTransformInfo> {
        let engine = transform.engine()?;
        if engine.engine_id() != self.engine_id {
            debug!(
                pool_engine = self.engine_id,
                transform_engine = engine.engine_id(),
                "ignoring transform from another engine"
            );
            return None;
        }
        transform.transform_info()
    }
}
