use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
#[cfg(not(target_arch = "wasm32"))]
use std::fs;
#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;
use url::Url;

use crate::services::request::FormContract;

pub const CONFIG_FILE: &str = "config.yml";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_file_field")]
    pub file_field: String,

    #[serde(default = "default_actor_count_field")]
    pub actor_count_field: String,

    #[serde(default = "default_descriptions_field")]
    pub descriptions_field: String,

    #[serde(default = "default_true")]
    pub send_voice_metadata: bool,

    #[serde(default = "default_output")]
    pub output_folder: String,

    #[serde(default = "default_output_stem")]
    pub output_stem: String,

    /// Sample script shown on start-up (URL, or a path relative to the page).
    #[serde(default)]
    pub demo_script: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            file_field: default_file_field(),
            actor_count_field: default_actor_count_field(),
            descriptions_field: default_descriptions_field(),
            send_voice_metadata: true,
            output_folder: default_output(),
            output_stem: default_output_stem(),
            demo_script: None,
        }
    }
}

fn default_endpoint() -> String {
    "http://127.0.0.1:5000/generate_audio".to_string()
}
fn default_file_field() -> String {
    "file".to_string()
}
fn default_actor_count_field() -> String {
    "numActors".to_string()
}
fn default_descriptions_field() -> String {
    "voiceDescriptions".to_string()
}
fn default_true() -> bool {
    true
}
fn default_output() -> String {
    "output".to_string()
}
fn default_output_stem() -> String {
    "generated".to_string()
}

impl Config {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("{} not found, using default settings", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.output_folder)
            .with_context(|| format!("Failed to create {}", self.output_folder))?;
        Ok(())
    }

    pub fn endpoint_url(&self) -> Result<Url> {
        let url = Url::parse(&self.endpoint)
            .with_context(|| format!("Invalid endpoint URL: {}", self.endpoint))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(anyhow!("Endpoint must use http or https, got {}", other)),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.endpoint_url()?;

        let fields = [
            ("file_field", &self.file_field),
            ("actor_count_field", &self.actor_count_field),
            ("descriptions_field", &self.descriptions_field),
        ];
        for (key, value) in &fields {
            if value.trim().is_empty() {
                bail!("{} must not be empty", key);
            }
        }
        for (i, (key, value)) in fields.iter().enumerate() {
            if let Some((other, _)) = fields[i + 1..].iter().find(|(_, v)| v == value) {
                bail!("{} and {} both use the field name '{}'", key, other, value);
            }
        }
        Ok(())
    }

    pub fn contract(&self) -> FormContract {
        FormContract {
            file_field: self.file_field.clone(),
            actor_count_field: self.actor_count_field.clone(),
            descriptions_field: self.descriptions_field.clone(),
            send_voice_metadata: self.send_voice_metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() -> Result<()> {
        let config = Config::default();
        config.validate()?;
        assert_eq!(config.endpoint_url()?.path(), "/generate_audio");
        assert_eq!(config.file_field, "file");
        assert!(config.send_voice_metadata);
        Ok(())
    }

    #[test]
    fn test_partial_yaml_fills_defaults() -> Result<()> {
        let config: Config = serde_yaml_ng::from_str(
            "endpoint: https://tts.example.com/api/generate_audio\nfile_field: textFile\n",
        )?;
        assert_eq!(config.file_field, "textFile");
        assert_eq!(config.actor_count_field, "numActors");
        assert_eq!(config.output_folder, "output");
        config.validate()?;
        Ok(())
    }

    #[test]
    fn test_example_config_matches_defaults() -> Result<()> {
        let config: Config = serde_yaml_ng::from_str(include_str!("../../config.example.yml"))?;
        assert_eq!(config, Config::default());
        Ok(())
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let config = Config {
            endpoint: "/api/generate_audio".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            endpoint: "ftp://example.com/upload".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            descriptions_field: "file".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            actor_count_field: " ".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let config = Config::load(temp_dir.path().join("config.yml"))?;
        assert_eq!(config, Config::default());
        Ok(())
    }

    #[test]
    fn test_save_then_load() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("config.yml");
        let config = Config {
            send_voice_metadata: false,
            demo_script: Some("http://127.0.0.1:8080/demo/tomorrow.txt".to_string()),
            ..Config::default()
        };
        config.save(&path)?;
        assert_eq!(Config::load(&path)?, config);
        Ok(())
    }
}
