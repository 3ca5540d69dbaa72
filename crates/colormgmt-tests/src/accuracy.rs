//! Accuracy measurement using perceptual color difference metrics
//!
//! Uses CIEDE2000 (deltaE2000) as the primary metric for color difference.
//! Engines round differently, so byte equality is the wrong yardstick.

use colormgmt_core::{Illuminant, Lab, Xyz, delta_e_2000};

/// Statistics from a deltaE comparison
#[derive(Debug, Clone)]
pub struct DeltaEStats {
    /// Mean deltaE across all samples
    pub mean: f64,
    /// Maximum deltaE
    pub max: f64,
    /// 95th percentile deltaE
    pub p95: f64,
    /// Number of samples
    pub count: usize,
}

impl DeltaEStats {
    /// Summarize a set of per-pixel differences
    pub fn from_samples(mut samples: Vec<f64>) -> Self {
        samples.sort_by(|a, b| a.total_cmp(b));

        let count = samples.len();
        let mean = if count == 0 {
            0.0
        } else {
            samples.iter().sum::<f64>() / count as f64
        };
        let max = samples.last().copied().unwrap_or(0.0);
        let p95 = samples
            .get((count as f64 * 0.95) as usize)
            .or(samples.last())
            .copied()
            .unwrap_or(0.0);

        Self {
            mean,
            max,
            p95,
            count,
        }
    }

    /// Check if all differences are imperceptible (deltaE < 1.0)
    pub fn is_excellent(&self) -> bool {
        self.max < 1.0
    }

    /// Check if differences are barely perceptible (deltaE < 2.0)
    pub fn is_good(&self) -> bool {
        self.max < 2.0
    }

    /// Check if differences are acceptable (deltaE < 3.5)
    pub fn is_acceptable(&self) -> bool {
        self.max < 3.5
    }
}

impl std::fmt::Display for DeltaEStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "n={} mean={:.3} p95={:.3} max={:.3}",
            self.count, self.mean, self.p95, self.max
        )
    }
}

/// Convert sRGB (0-255) to linear RGB
pub fn srgb_to_linear(value: u8) -> f64 {
    let v = f64::from(value) / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Convert an sRGB pixel to Lab relative to D65
pub fn srgb_to_lab(rgb: [u8; 3]) -> Lab {
    let [r, g, b] = rgb.map(srgb_to_linear);
    let xyz = Xyz::new(
        r * 0.4124564 + g * 0.3575761 + b * 0.1804375,
        r * 0.2126729 + g * 0.7151522 + b * 0.0721750,
        r * 0.0193339 + g * 0.1191920 + b * 0.9503041,
    );
    Lab::from_xyz(xyz, Illuminant::D65)
}

/// Compare two packed RGB8 buffers and compute deltaE statistics
pub fn compare_rgb_buffers(reference: &[u8], result: &[u8]) -> DeltaEStats {
    assert_eq!(reference.len(), result.len());
    assert_eq!(reference.len() % 3, 0);

    let samples = reference
        .chunks_exact(3)
        .zip(result.chunks_exact(3))
        .map(|(a, b)| delta_e_2000(srgb_to_lab([a[0], a[1], a[2]]), srgb_to_lab([b[0], b[1], b[2]])))
        .collect();
    DeltaEStats::from_samples(samples)
}

/// Compare two Lab sample sequences
pub fn compare_lab_buffers(reference: &[Lab], result: &[Lab]) -> DeltaEStats {
    assert_eq!(reference.len(), result.len());
    DeltaEStats::from_samples(
        reference
            .iter()
            .zip(result)
            .map(|(&a, &b)| delta_e_2000(a, b))
            .collect(),
    )
}

/// Decode a `LabDbl` buffer (three native-endian `f64` per pixel)
pub fn lab_dbl_pixels(data: &[u8]) -> Vec<Lab> {
    data.chunks_exact(24)
        .map(|pixel| {
            let mut v = [0.0f64; 3];
            for (slot, bytes) in v.iter_mut().zip(pixel.chunks_exact(8)) {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                *slot = f64::from_ne_bytes(raw);
            }
            Lab::new(v[0], v[1], v[2])
        })
        .collect()
}
