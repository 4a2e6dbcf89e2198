use bytes::Bytes;
use std::collections::HashMap;

use crate::error::{AppError, Result};

/// One raw file extracted from a multipart request.
#[derive(Debug, Clone)]
pub struct FilePayload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// A named attachment slot on a resource type.
#[derive(Debug, Clone, Copy)]
pub struct SlotSpec {
    pub name: &'static str,
    pub required: bool,
}

/// Static per-resource attachment configuration: which slots exist and
/// which must be present at creation.
#[derive(Debug, Clone, Copy)]
pub struct ResourceSpec {
    pub resource: &'static str,
    pub slots: &'static [SlotSpec],
}

impl ResourceSpec {
    pub fn slot(&self, name: &str) -> Option<&'static SlotSpec> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn has_slot(&self, name: &str) -> bool {
        self.slot(name).is_some()
    }
}

/// File payloads validated against a resource's declared slot set. This is
/// the only way request files reach the lifecycle flows; an open-ended
/// field map never crosses this boundary.
#[derive(Debug, Default)]
pub struct SlotPayloads {
    payloads: HashMap<&'static str, FilePayload>,
}

impl SlotPayloads {
    /// Validate the files of a create request: unknown slot names are
    /// rejected, missing required slots and empty payloads are enumerated.
    pub fn for_create(spec: &ResourceSpec, files: HashMap<String, FilePayload>) -> Result<Self> {
        let accepted = Self::accept_known(spec, files)?;

        let mut errors = Vec::new();
        for slot in spec.slots {
            match accepted.payloads.get(slot.name) {
                Some(payload) if payload.data.is_empty() => {
                    errors.push(format!("File {} kosong", slot.name));
                }
                None if slot.required => {
                    errors.push(format!("File {} wajib diupload", slot.name));
                }
                _ => {}
            }
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        Ok(accepted)
    }

    /// Validate the files of an update request: required-ness is waived,
    /// an absent slot means "leave the existing blob untouched".
    pub fn for_update(spec: &ResourceSpec, files: HashMap<String, FilePayload>) -> Result<Self> {
        let accepted = Self::accept_known(spec, files)?;

        let errors: Vec<String> = accepted
            .payloads
            .iter()
            .filter(|(_, payload)| payload.data.is_empty())
            .map(|(name, _)| format!("File {} kosong", name))
            .collect();

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        Ok(accepted)
    }

    fn accept_known(spec: &ResourceSpec, files: HashMap<String, FilePayload>) -> Result<Self> {
        let mut payloads = HashMap::new();
        for (name, payload) in files {
            match spec.slot(&name) {
                Some(slot) => {
                    payloads.insert(slot.name, payload);
                }
                None => {
                    return Err(AppError::BadRequest(format!(
                        "Field file tidak dikenal: {}",
                        name
                    )));
                }
            }
        }
        Ok(Self { payloads })
    }

    pub fn get(&self, slot_name: &str) -> Option<&FilePayload> {
        self.payloads.get(slot_name)
    }

    /// Fetch a slot that create-validation guaranteed to be present.
    pub fn required(&self, slot_name: &str) -> Result<&FilePayload> {
        self.payloads.get(slot_name).ok_or_else(|| {
            AppError::Internal(format!("slot {} missing after validation", slot_name))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUNDEL: ResourceSpec = ResourceSpec {
        resource: "dokumen",
        slots: &[
            SlotSpec { name: "suratMasuk", required: true },
            SlotSpec { name: "suratKeluar", required: true },
            SlotSpec { name: "lpjKegiatan", required: true },
        ],
    };

    fn file(data: &'static [u8]) -> FilePayload {
        FilePayload {
            file_name: "surat.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            data: Bytes::from_static(data),
        }
    }

    #[test]
    fn create_enumerates_every_missing_required_slot() {
        let mut files = HashMap::new();
        files.insert("suratMasuk".to_string(), file(b"pdf"));

        let err = SlotPayloads::for_create(&BUNDEL, files).unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert_eq!(errors.len(), 2);
                assert!(errors.iter().any(|e| e.contains("suratKeluar")));
                assert!(errors.iter().any(|e| e.contains("lpjKegiatan")));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn unknown_slot_name_is_a_bad_request() {
        let mut files = HashMap::new();
        files.insert("lampiran".to_string(), file(b"pdf"));

        assert!(matches!(
            SlotPayloads::for_update(&BUNDEL, files),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn update_accepts_a_subset_of_slots() {
        let mut files = HashMap::new();
        files.insert("suratKeluar".to_string(), file(b"pdf"));

        let payloads = SlotPayloads::for_update(&BUNDEL, files).unwrap();
        assert!(payloads.get("suratKeluar").is_some());
        assert!(payloads.get("suratMasuk").is_none());
    }

    #[test]
    fn empty_payload_is_rejected_everywhere() {
        let mut files = HashMap::new();
        files.insert("suratMasuk".to_string(), file(b""));

        assert!(matches!(
            SlotPayloads::for_update(&BUNDEL, files),
            Err(AppError::Validation(_))
        ));
    }
}
