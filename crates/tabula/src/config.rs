// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec configuration.
//!
//! A process-wide default is installed with [`init`] and read with
//! [`current`]; encoders can also be built with an explicit configuration.
//!
//! With the `config-loaders` feature, configurations can be loaded from YAML:
//!
//! ```yaml
//! decimal:
//!   precision: 28
//!   scale: 6
//! reserved_field_names: [offset, limit]
//! check_reserved_names: true
//! ```

use crate::decimal::MAX_PRECISION;
use crate::error::{Error, Result};
use std::sync::{Arc, OnceLock};

#[cfg(feature = "config-loaders")]
use serde::Deserialize;
#[cfg(feature = "config-loaders")]
use std::path::Path;

/// Default precision of fractional decimals.
pub const DEFAULT_DECIMAL_PRECISION: u8 = 38;
/// Default scale of fractional decimals.
pub const DEFAULT_DECIMAL_SCALE: u8 = 18;

/// Precision and scale of the `DECIMAL` column used for big decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config-loaders", derive(Deserialize))]
#[cfg_attr(feature = "config-loaders", serde(default))]
pub struct DecimalConfig {
    /// Total digits.
    pub precision: u8,
    /// Fractional digits.
    pub scale: u8,
}

impl Default for DecimalConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_DECIMAL_PRECISION,
            scale: DEFAULT_DECIMAL_SCALE,
        }
    }
}

/// Codec configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-loaders", derive(Deserialize))]
#[cfg_attr(feature = "config-loaders", serde(default))]
pub struct CodecConfig {
    /// Decimal layout for big decimals.
    pub decimal: DecimalConfig,
    /// Field names rejected in addition to the language keywords.
    pub reserved_field_names: Vec<String>,
    /// Reject record fields named after reserved identifiers.
    pub check_reserved_names: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            decimal: DecimalConfig::default(),
            reserved_field_names: Vec::new(),
            check_reserved_names: true,
        }
    }
}

impl CodecConfig {
    /// Check the decimal layout.
    pub fn validate(&self) -> Result<()> {
        let DecimalConfig { precision, scale } = self.decimal;
        if precision == 0 || precision > MAX_PRECISION {
            return Err(Error::Config(format!(
                "decimal precision must be in 1..={}, got {}",
                MAX_PRECISION, precision
            )));
        }
        if scale > precision {
            return Err(Error::Config(format!(
                "decimal scale {} exceeds precision {}",
                scale, precision
            )));
        }
        Ok(())
    }

    /// True if `name` is in the configured extra reserved names.
    pub fn is_extra_reserved(&self, name: &str) -> bool {
        self.reserved_field_names.iter().any(|n| n == name)
    }

    /// Parse and validate a YAML document.
    #[cfg(feature = "config-loaders")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::Config(format!("Failed to parse YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    #[cfg(feature = "config-loaders")]
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        log::debug!("[config] loading codec config from {}", path.display());
        Self::from_yaml_str(&yaml)
    }
}

static GLOBAL_CONFIG: OnceLock<Arc<CodecConfig>> = OnceLock::new();

/// Install the process-wide configuration. Fails if it is invalid or if a
/// configuration was already installed (or read through [`current`]).
pub fn init(config: CodecConfig) -> Result<Arc<CodecConfig>> {
    config.validate()?;
    let config = Arc::new(config);
    GLOBAL_CONFIG
        .set(config.clone())
        .map_err(|_| Error::Config("codec configuration already initialized".into()))?;
    log::debug!("[config] installed {:?}", config);
    Ok(config)
}

/// Process-wide configuration (the default one if [`init`] was never called).
pub fn current() -> Arc<CodecConfig> {
    GLOBAL_CONFIG
        .get_or_init(|| Arc::new(CodecConfig::default()))
        .clone()
}
