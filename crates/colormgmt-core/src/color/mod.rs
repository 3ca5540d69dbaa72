//! Colorimetric value types
//!
//! CIE XYZ and CIELAB values as exchanged with the engines, the standard
//! white points behind [`Illuminant`](crate::structs::Illuminant), and color
//! difference metrics.

pub mod lab;
pub mod white_point;
pub mod xyz;

pub use lab::{Lab, delta_e, delta_e_2000};
pub use white_point::{D50, D65, WhitePoint};
pub use xyz::Xyz;
