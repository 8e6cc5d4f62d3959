use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub model: ModelConfig,
    pub uploads: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub path: String,
    /// Comma-separated label override; falls back to the built-in label set.
    pub class_labels: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub folder: String,
}

impl InferenceConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and PORT)
        let common_config = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(InferenceConfig {
            common: common_config,
            model: ModelConfig {
                path: get_env(
                    "MODEL_PATH",
                    Some("./model/final_resnet50_4class.onnx"),
                    is_prod,
                )?,
                class_labels: env::var("CLASS_LABELS").ok().filter(|v| !v.trim().is_empty()),
            },
            uploads: UploadConfig {
                folder: get_env("UPLOAD_FOLDER", Some("./uploads"), is_prod)?,
            },
        })
    }
}

impl ModelConfig {
    /// Artifact file name as reported by the health endpoint.
    pub fn artifact_name(&self) -> String {
        Path::new(&self.path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.clone())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}
