//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use picdrop_core::Config;

/// Validate critical configuration values
///
/// Hard errors come from `Config::validate`; settings that are legal but likely wrong for
/// the environment are only logged.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    let is_production = config.is_production();

    if is_production {
        let base = config.public_base_url();
        if base.contains("localhost") || base.contains("127.0.0.1") {
            tracing::warn!(
                public_base_url = %base,
                "PUBLIC_BASE_URL points at a loopback address in production - returned URLs will not resolve for clients"
            );
        }

        if !config.enforce_file_type() {
            tracing::warn!(
                "ENFORCE_FILE_TYPE is off in production - any file posted under 'image' will be stored"
            );
        }
    }

    if config.upload_dir().is_relative() {
        tracing::debug!(
            path = %config.upload_dir().display(),
            "UPLOAD_DIR is relative to the working directory"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use picdrop_core::ServiceConfig;

    #[test]
    fn accepts_defaults() {
        let config = Config::from(ServiceConfig::with_upload_dir("/tmp/picdrop"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_invalid_config() {
        let mut service = ServiceConfig::with_upload_dir("/tmp/picdrop");
        service.upload_read_timeout_secs = 0;
        assert!(validate_config(&Config::from(service)).is_err());
    }
}
