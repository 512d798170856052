// SPDX-License-Identifier: Apache-2.0

//! YAML gateway configuration with strict validation.
//!
//! All fields carry defaults so an absent or minimal file yields a
//! working gateway; invalid values fail startup rather than surfacing
//! mid-request.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ForgeError, ForgeResult};

/// Raw configuration as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default = "default_listen_port")]
    listen_port: u16,
    #[serde(default = "default_templates_dir")]
    templates_dir: PathBuf,
    #[serde(default = "default_max_upload_bytes")]
    max_upload_bytes: usize,
    #[serde(default = "default_build_timeout_secs")]
    build_timeout_secs: u64,
    #[serde(default = "default_run_timeout_secs")]
    run_timeout_secs: u64,
}

fn default_listen_port() -> u16 {
    8080
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024 // 10 MiB
}

fn default_build_timeout_secs() -> u64 {
    300
}

fn default_run_timeout_secs() -> u64 {
    60
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            templates_dir: default_templates_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            build_timeout_secs: default_build_timeout_secs(),
            run_timeout_secs: default_run_timeout_secs(),
        }
    }
}

/// Validated gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub listen_port: u16,
    pub templates_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub build_deadline: Duration,
    pub run_deadline: Duration,
}

impl GatewayConfig {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> ForgeResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ForgeError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ForgeError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> ForgeResult<Self> {
        let raw: RawConfig = serde_yaml::from_str(content).map_err(|e| ForgeError::ConfigParse {
            message: format!("YAML parse error: {}", e),
        })?;

        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> ForgeResult<Self> {
        if raw.listen_port == 0 {
            return Err(ForgeError::ConfigInvalid {
                field: "listen_port",
                reason: "port 0 is reserved".to_string(),
            });
        }

        if raw.max_upload_bytes == 0 {
            return Err(ForgeError::ConfigInvalid {
                field: "max_upload_bytes",
                reason: "upload cap must be non-zero".to_string(),
            });
        }

        if raw.build_timeout_secs == 0 {
            return Err(ForgeError::ConfigInvalid {
                field: "build_timeout_secs",
                reason: "build deadline must be non-zero".to_string(),
            });
        }

        if raw.run_timeout_secs == 0 {
            return Err(ForgeError::ConfigInvalid {
                field: "run_timeout_secs",
                reason: "run deadline must be non-zero".to_string(),
            });
        }

        Ok(Self {
            listen_port: raw.listen_port,
            templates_dir: raw.templates_dir,
            max_upload_bytes: raw.max_upload_bytes,
            build_deadline: Duration::from_secs(raw.build_timeout_secs),
            run_deadline: Duration::from_secs(raw.run_timeout_secs),
        })
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            templates_dir: default_templates_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            build_deadline: Duration::from_secs(default_build_timeout_secs()),
            run_deadline: Duration::from_secs(default_run_timeout_secs()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.listen_port, 8080);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.build_deadline, Duration::from_secs(300));
        assert_eq!(config.run_deadline, Duration::from_secs(60));
        assert_eq!(config.templates_dir, PathBuf::from("templates"));
    }

    #[test]
    fn test_load_string_overrides() {
        let config = GatewayConfig::load_string(
            "listen_port: 9090\nrun_timeout_secs: 5\ntemplates_dir: /etc/funcforge/templates\n",
        )
        .unwrap();

        assert_eq!(config.listen_port, 9090);
        assert_eq!(config.run_deadline, Duration::from_secs(5));
        assert_eq!(
            config.templates_dir,
            PathBuf::from("/etc/funcforge/templates")
        );
        // Unspecified fields keep their defaults.
        assert_eq!(config.build_deadline, Duration::from_secs(300));
    }

    #[test]
    fn test_zero_port_rejected() {
        let err = GatewayConfig::load_string("listen_port: 0\n").unwrap_err();
        assert!(matches!(
            err,
            ForgeError::ConfigInvalid {
                field: "listen_port",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_deadline_rejected() {
        let err = GatewayConfig::load_string("run_timeout_secs: 0\n").unwrap_err();
        assert!(matches!(err, ForgeError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_malformed_yaml_rejected() {
        let err = GatewayConfig::load_string("listen_port: [8080\n").unwrap_err();
        assert!(matches!(err, ForgeError::ConfigParse { .. }));
    }

    #[test]
    fn test_missing_file_rejected() {
        let err = GatewayConfig::load_file("/nonexistent/funcforge.yaml").unwrap_err();
        assert!(matches!(err, ForgeError::ConfigNotFound { .. }));
    }
}
