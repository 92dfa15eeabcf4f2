// GestLock — Gesture Trimmer
//
// Captures start and end with the hand at rest. Dropping the quiet head and
// tail leaves only the motion, so two performances of the same gesture line up
// regardless of how long the user waited before moving.

use super::Sample3;

/// Remove the quiet prefix and suffix of `samples` in place.
///
/// A sample is quiet when every axis magnitude is below `threshold`. The
/// active span is shifted to the front in one pass and the vector truncated,
/// so the cost stays linear in the window length. An all-quiet input leaves
/// an empty vector.
pub fn trim_quiet(samples: &mut Vec<Sample3>, threshold: f32) {
    let Some(start) = samples.iter().position(|s| !s.is_quiet(threshold)) else {
        samples.clear();
        return;
    };
    // `start` exists, so a last active index does too.
    let end = samples
        .iter()
        .rposition(|s| !s.is_quiet(threshold))
        .unwrap_or(start);

    let kept = end - start + 1;
    if start > 0 {
        samples.copy_within(start..=end, 0);
    }
    samples.truncate(kept);
}

#[cfg(test)]
mod tests {
    use super::*;

    const TH: f32 = 1e-5;

    fn quiet() -> Sample3 {
        Sample3::new(0.0, 1e-6, -1e-6)
    }

    #[test]
    fn all_quiet_becomes_empty() {
        let mut samples = vec![quiet(); 50];
        trim_quiet(&mut samples, TH);
        assert!(samples.is_empty());
    }

    #[test]
    fn empty_stays_empty() {
        let mut samples: Vec<Sample3> = Vec::new();
        trim_quiet(&mut samples, TH);
        assert!(samples.is_empty());
    }

    #[test]
    fn single_active_sample_is_kept() {
        for k in [0usize, 7, 19] {
            let mut samples = vec![quiet(); 20];
            samples[k] = Sample3::new(0.5, 0.0, 0.0);
            trim_quiet(&mut samples, TH);
            assert_eq!(samples, vec![Sample3::new(0.5, 0.0, 0.0)]);
        }
    }

    #[test]
    fn inner_quiet_samples_survive() {
        let a = Sample3::new(1.0, 0.0, 0.0);
        let b = Sample3::new(0.0, 0.0, -2.0);
        let mut samples = vec![quiet(), quiet(), a, quiet(), b, quiet()];
        trim_quiet(&mut samples, TH);
        assert_eq!(samples, vec![a, quiet(), b]);
    }

    #[test]
    fn untouched_when_no_quiet_edges() {
        let seq: Vec<Sample3> = (1..=5).map(|i| Sample3::new(i as f32, 0.0, 0.0)).collect();
        let mut samples = seq.clone();
        trim_quiet(&mut samples, TH);
        assert_eq!(samples, seq);
    }
}
