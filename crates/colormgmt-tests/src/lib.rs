//! # colormgmt-tests
//!
//! Integration testing support for colormgmt.
//!
//! This crate provides:
//! - Deterministic pixel patterns in every packed format the engines accept
//! - Accuracy measurements using deltaE2000
//! - Reference transforms built directly on `lcms2`, bypassing the engine layer
//! - Fixture discovery and scratch directories
//!
//! ## Test Categories
//!
//! 1. **Pool lifecycle**: sharing, expiry and engine isolation of transforms
//! 2. **Engine parity**: lcms2 and moxcms backends agree within deltaE bounds
//! 3. **CMYK transforms**: channel orders, alpha and black preservation
//! 4. **Soft proofing**: proof chains and proofing-flag handling
//! 5. **Profile scan**: directory enumeration and the path cache

pub mod accuracy;
pub mod fixtures;
pub mod patterns;
pub mod reference;

pub use accuracy::{DeltaEStats, compare_lab_buffers, compare_rgb_buffers};
pub use fixtures::{ScratchDir, find_cmyk_profile, init_tracing, press_cmyk_profile};
pub use patterns::{TestPattern, generate_pattern, pack_rgb8};
