//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.model.model.is_empty() {
            return Err(ConfigError::Validation("model.model must not be empty".into()));
        }
        if self.model.image_size == 0 {
            return Err(ConfigError::Validation(
                "model.image_size must be > 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.policy.confidence_floor) {
            return Err(ConfigError::Validation(
                "policy.confidence_floor must be between 0.0 and 1.0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.policy.clean_evidence_floor) {
            return Err(ConfigError::Validation(
                "policy.clean_evidence_floor must be between 0.0 and 1.0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::Validation(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::Validation(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.infer_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "limits.infer_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_confidence_floor() {
        let mut config = Config::default();
        config.policy.confidence_floor = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("confidence_floor"));

        config.policy.confidence_floor = -0.1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("confidence_floor"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_clean_floor() {
        let mut config = Config::default();
        config.policy.clean_evidence_floor = 2.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("clean_evidence_floor"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.infer_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("infer_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_empty_model() {
        let mut config = Config::default();
        config.model.model = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("model.model"));
    }
}
