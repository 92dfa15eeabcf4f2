// GestLock — Gesture Data Types
//
// A gesture is a short time series of calibrated 3-axis angular-rate samples.
// Sequences are moved, never shared, between the capture buffer, the
// authentication candidate and the enrolled template.

pub mod capture;
pub mod engine;
pub mod similarity;
pub mod template;
pub mod trim;

// ---------------------------------------------------------------------------
// Sample
// ---------------------------------------------------------------------------

/// One calibrated gyroscope reading in rad/s.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Selects one axis of a [`Sample3`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

impl Sample3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn axis(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// True when every axis magnitude is below `threshold`.
    pub fn is_quiet(&self, threshold: f32) -> bool {
        self.x.abs() < threshold && self.y.abs() < threshold && self.z.abs() < threshold
    }

    /// Euclidean distance between two samples.
    pub fn distance(&self, other: &Sample3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn scaled(&self, k: f32) -> Self {
        Self::new(self.x * k, self.y * k, self.z * k)
    }
}

// ---------------------------------------------------------------------------
// Sequence
// ---------------------------------------------------------------------------

/// Ordered gesture time series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureSequence {
    samples: Vec<Sample3>,
}

impl GestureSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, sample: Sample3) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[Sample3] {
        &self.samples
    }

    /// Scalar series of a single axis.
    pub fn axis(&self, axis: Axis) -> Vec<f32> {
        self.samples.iter().map(|s| s.axis(axis)).collect()
    }

    /// Strip quiet leading/trailing samples in place. See [`trim::trim_quiet`].
    pub fn trim(&mut self, threshold: f32) {
        trim::trim_quiet(&mut self.samples, threshold);
    }

    pub fn into_inner(self) -> Vec<Sample3> {
        self.samples
    }
}

impl From<Vec<Sample3>> for GestureSequence {
    fn from(samples: Vec<Sample3>) -> Self {
        Self { samples }
    }
}

impl FromIterator<Sample3> for GestureSequence {
    fn from_iter<T: IntoIterator<Item = Sample3>>(iter: T) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn distance_is_euclidean() {
        let a = Sample3::new(0.0, 0.0, 0.0);
        let b = Sample3::new(3.0, 4.0, 0.0);
        assert_relative_eq!(a.distance(&b), 5.0);
    }

    #[test]
    fn quiet_requires_all_axes() {
        assert!(Sample3::new(1e-6, -1e-6, 0.0).is_quiet(1e-5));
        assert!(!Sample3::new(1e-6, 0.0, 2e-5).is_quiet(1e-5));
    }

    #[test]
    fn axis_extracts_in_order() {
        let seq: GestureSequence =
            (0..3).map(|i| Sample3::new(i as f32, 10.0, -(i as f32))).collect();
        assert_eq!(seq.axis(Axis::X), vec![0.0, 1.0, 2.0]);
        assert_eq!(seq.axis(Axis::Z), vec![0.0, -1.0, -2.0]);
    }
}
