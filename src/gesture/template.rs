// GestLock — Template Persistence
//
// The enrolled gesture survives reboots. Storage back-ends only see an opaque
// blob; the layout is:
//
//   offset 0  u16 LE   sample count N
//   offset 2  N × (f32 LE x, f32 LE y, f32 LE z)
//
// Back-ends: `MemoryStore` (host / tests) and the NVS store in
// `drivers::storage` (target).

use std::sync::{Arc, Mutex};

use anyhow::{bail, ensure};

use super::{GestureSequence, Sample3};
use crate::config::*;

const HEADER_LEN: usize = 2;
const SAMPLE_LEN: usize = 12;

/// Serialised size of a template holding `samples` samples.
pub const fn encoded_len(samples: usize) -> usize {
    HEADER_LEN + samples * SAMPLE_LEN
}

/// Serialise a template into the storage blob layout.
pub fn encode(template: &GestureSequence) -> anyhow::Result<Vec<u8>> {
    let count = template.len();
    ensure!(
        count <= TEMPLATE_MAX_SAMPLES,
        "template too long ({} samples, max {})",
        count,
        TEMPLATE_MAX_SAMPLES
    );

    let mut blob = Vec::with_capacity(encoded_len(count));
    blob.extend_from_slice(&(count as u16).to_le_bytes());
    for s in template.as_slice() {
        blob.extend_from_slice(&s.x.to_le_bytes());
        blob.extend_from_slice(&s.y.to_le_bytes());
        blob.extend_from_slice(&s.z.to_le_bytes());
    }
    Ok(blob)
}

/// Parse a storage blob back into a template.
pub fn decode(blob: &[u8]) -> anyhow::Result<GestureSequence> {
    if blob.len() < HEADER_LEN {
        bail!("template blob truncated ({} bytes)", blob.len());
    }
    let count = u16::from_le_bytes([blob[0], blob[1]]) as usize;
    ensure!(
        count <= TEMPLATE_MAX_SAMPLES,
        "template header claims {} samples, max {}",
        count,
        TEMPLATE_MAX_SAMPLES
    );
    ensure!(
        blob.len() == encoded_len(count),
        "template blob is {} bytes, header expects {}",
        blob.len(),
        encoded_len(count)
    );

    let f = |b: &[u8]| f32::from_le_bytes([b[0], b[1], b[2], b[3]]);
    Ok(blob[HEADER_LEN..]
        .chunks_exact(SAMPLE_LEN)
        .map(|c| Sample3::new(f(&c[0..4]), f(&c[4..8]), f(&c[8..12])))
        .collect())
}

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// Non-volatile home of the single enrolled template.
pub trait TemplateStore: Send {
    /// Read the stored template, `None` when nothing is enrolled.
    fn load(&mut self) -> anyhow::Result<Option<GestureSequence>>;
    /// Replace the stored template wholesale.
    fn save(&mut self, template: &GestureSequence) -> anyhow::Result<()>;
    /// Forget the stored template. Erasing an empty store is not an error.
    fn erase(&mut self) -> anyhow::Result<()>;
}

/// Volatile store keeping the encoded blob in RAM.
///
/// Clones share the same slot, which lets a test keep a handle to inspect or
/// corrupt what the engine persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blob: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored bytes, if any.
    pub fn blob(&self) -> Option<Vec<u8>> {
        self.slot().clone()
    }

    /// Overwrite the raw stored bytes.
    pub fn set_blob(&self, blob: Option<Vec<u8>>) {
        *self.slot() = blob;
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Vec<u8>>> {
        // A poisoned slot still holds valid bytes.
        self.blob.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TemplateStore for MemoryStore {
    fn load(&mut self) -> anyhow::Result<Option<GestureSequence>> {
        self.slot().as_deref().map(decode).transpose()
    }

    fn save(&mut self, template: &GestureSequence) -> anyhow::Result<()> {
        let blob = encode(template)?;
        *self.slot() = Some(blob);
        Ok(())
    }

    fn erase(&mut self) -> anyhow::Result<()> {
        *self.slot() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_template() -> GestureSequence {
        (0..12)
            .map(|i| Sample3::new(i as f32 * 0.25, -1.5, f32::MIN_POSITIVE * i as f32))
            .collect()
    }

    #[test]
    fn blob_layout_is_count_then_samples() {
        let t: GestureSequence = vec![Sample3::new(1.0, 2.0, 3.0)].into();
        let blob = encode(&t).unwrap();
        assert_eq!(blob.len(), encoded_len(1));
        assert_eq!(&blob[0..2], &[1, 0]);
        assert_eq!(&blob[2..6], &1.0f32.to_le_bytes());
        assert_eq!(&blob[10..14], &3.0f32.to_le_bytes());
    }

    #[test]
    fn decode_restores_exact_values() {
        let t = sample_template();
        assert_eq!(decode(&encode(&t).unwrap()).unwrap(), t);
    }

    #[test]
    fn decode_rejects_bad_lengths() {
        let blob = encode(&sample_template()).unwrap();
        assert!(decode(&blob[..1]).is_err());
        assert!(decode(&blob[..blob.len() - 1]).is_err());

        let mut oversized = blob.clone();
        oversized[0..2].copy_from_slice(&(TEMPLATE_MAX_SAMPLES as u16 + 1).to_le_bytes());
        assert!(decode(&oversized).is_err());
    }

    #[test]
    fn encode_rejects_oversized_template() {
        let t: GestureSequence = vec![Sample3::default(); TEMPLATE_MAX_SAMPLES + 1].into();
        assert!(encode(&t).is_err());
    }

    #[test]
    fn memory_store_lifecycle() {
        let mut store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());

        store.save(&sample_template()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample_template()));

        store.erase().unwrap();
        assert!(store.load().unwrap().is_none());
        store.erase().unwrap();
    }
}
