use fieldbook_model::RegionRegistry;
use serde::Serialize;

pub const CONFIG_SCHEMA_VERSION: &str = "1";

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    /// Upper bound on the whole multipart upload body.
    pub max_upload_bytes: usize,
    /// File extension accepted for uploads, lower case with leading dot.
    pub upload_extension: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 5 * 1024 * 1024,
            upload_extension: ".xlsx".to_string(),
        }
    }
}

/// Startup contract: configuration is loaded once in `main` and must be
/// usable before the listener binds.
pub fn validate_startup_config(api: &ApiConfig, registry: &RegionRegistry) -> Result<(), String> {
    if api.max_upload_bytes == 0 {
        return Err("max upload size must be > 0".to_string());
    }
    if !api.upload_extension.starts_with('.') {
        return Err("upload extension must start with a dot".to_string());
    }
    if registry.is_empty() {
        return Err("region registry must not be empty".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes_validation() {
        let registry = RegionRegistry::default();
        validate_startup_config(&ApiConfig::default(), &registry).expect("valid");
    }

    #[test]
    fn zero_upload_limit_is_rejected() {
        let api = ApiConfig {
            max_upload_bytes: 0,
            ..ApiConfig::default()
        };
        let err = validate_startup_config(&api, &RegionRegistry::default()).expect_err("invalid");
        assert!(err.contains("upload size"));
    }

    #[test]
    fn empty_registry_is_rejected() {
        let registry = RegionRegistry::new(Vec::new());
        let err =
            validate_startup_config(&ApiConfig::default(), &registry).expect_err("invalid");
        assert!(err.contains("region registry"));
    }
}
