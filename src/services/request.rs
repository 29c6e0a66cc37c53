use crate::core::form::VoiceForm;
use anyhow::{Context, Result};
use reqwest::multipart;

const FALLBACK_MIME: &str = "text/plain";

/// The script file picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: None,
            bytes,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        let mime = mime.into();
        self.mime = (!mime.is_empty()).then_some(mime);
        self
    }
}

/// Field names and payload shape expected by the generation endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormContract {
    pub file_field: String,
    pub actor_count_field: String,
    pub descriptions_field: String,
    pub send_voice_metadata: bool,
}

/// Everything one submission sends, captured once when the user submits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub file: UploadFile,
    pub actor_count: usize,
    pub descriptions: Vec<String>,
}

impl GenerationRequest {
    pub fn new(form: &VoiceForm, file: UploadFile) -> Self {
        Self {
            file,
            actor_count: form.actor_count(),
            descriptions: form.descriptions(),
        }
    }

    pub fn text_fields(&self, contract: &FormContract) -> Result<Vec<(String, String)>> {
        if !contract.send_voice_metadata {
            return Ok(Vec::new());
        }
        let descriptions = serde_json::to_string(&self.descriptions)
            .context("Failed to serialize voice descriptions")?;
        Ok(vec![
            (contract.actor_count_field.clone(), self.actor_count.to_string()),
            (contract.descriptions_field.clone(), descriptions),
        ])
    }
}

pub fn build_form(request: &GenerationRequest, contract: &FormContract) -> Result<multipart::Form> {
    let mime = request.file.mime.as_deref().unwrap_or(FALLBACK_MIME);
    let file_part = multipart::Part::bytes(request.file.bytes.clone())
        .file_name(request.file.name.clone())
        .mime_str(mime)
        .with_context(|| format!("Invalid mime type: {}", mime))?;

    let mut form = multipart::Form::new().part(contract.file_field.clone(), file_part);
    for (name, value) in request.text_fields(contract)? {
        form = form.text(name, value);
    }
    Ok(form)
}
