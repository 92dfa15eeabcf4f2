// GestLock — NVS Template Store
//
// Keeps the encoded template as one blob in its own NVS namespace.

use anyhow::Context;
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};

use gestlock::config::*;
use gestlock::gesture::template::{self, TemplateStore};
use gestlock::gesture::GestureSequence;

pub struct NvsStore {
    nvs: EspNvs<NvsDefault>,
}

impl NvsStore {
    pub fn new(partition: EspDefaultNvsPartition) -> anyhow::Result<Self> {
        let nvs = EspNvs::new(partition, NVS_NAMESPACE, true)
            .with_context(|| format!("opening NVS namespace {NVS_NAMESPACE}"))?;
        Ok(Self { nvs })
    }
}

impl TemplateStore for NvsStore {
    fn load(&mut self) -> anyhow::Result<Option<GestureSequence>> {
        let mut buf = vec![0u8; template::encoded_len(TEMPLATE_MAX_SAMPLES)];
        match self.nvs.get_blob(NVS_TEMPLATE_KEY, &mut buf)? {
            Some(blob) => template::decode(blob).map(Some),
            None => Ok(None),
        }
    }

    fn save(&mut self, template: &GestureSequence) -> anyhow::Result<()> {
        let blob = template::encode(template)?;
        self.nvs.set_blob(NVS_TEMPLATE_KEY, &blob)?;
        log::debug!("Template written to NVS ({} bytes)", blob.len());
        Ok(())
    }

    fn erase(&mut self) -> anyhow::Result<()> {
        self.nvs.remove(NVS_TEMPLATE_KEY)?;
        Ok(())
    }
}
