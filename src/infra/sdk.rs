//! SDK registry
//!
//! Resolves SDK names declared in the manifest into [`SdkDescriptor`]s. When
//! a version is not configured it is read from the SDK's description file.

use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::defaults::SDK_DESCRIPTION_FILE;
use crate::core::context::{SdkDescriptor, SdkLookup};
use crate::core::manifest::SdkConfig;
use crate::error::SdkError;

/// SDK table backed by the manifest's `[sdks]` section
#[derive(Debug, Clone, Default)]
pub struct SdkRegistry {
    sdks: BTreeMap<String, SdkConfig>,
}

impl SdkRegistry {
    /// Create a registry from manifest SDK declarations
    pub fn new(sdks: BTreeMap<String, SdkConfig>) -> Self {
        Self { sdks }
    }

    /// Registered SDK names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sdks.keys().map(String::as_str)
    }
}

impl SdkLookup for SdkRegistry {
    fn resolve(&self, name: &str) -> Result<SdkDescriptor, SdkError> {
        let config = self.sdks.get(name).ok_or_else(|| SdkError::NotFound {
            name: name.to_string(),
        })?;

        if !config.home.is_dir() {
            return Err(SdkError::HomeNotFound {
                name: name.to_string(),
                home: config.home.clone(),
            });
        }

        let version = match &config.version {
            Some(version) => version.clone(),
            None => read_description_version(&config.home).ok_or_else(|| {
                SdkError::UnknownVersion {
                    name: name.to_string(),
                }
            })?,
        };

        tracing::debug!("Resolved SDK '{name}' version {version} at {}", config.home.display());

        Ok(SdkDescriptor {
            name: name.to_string(),
            home: config.home.clone(),
            version,
            kind: config.kind,
            classpath: config.classpath.clone(),
        })
    }
}

/// Read `<version>` (and `<build>`, if present) from the SDK description file
pub fn read_description_version(home: &Path) -> Option<String> {
    let content = std::fs::read_to_string(home.join(SDK_DESCRIPTION_FILE)).ok()?;
    parse_description_version(&content)
}

fn parse_description_version(content: &str) -> Option<String> {
    let tag = |name: &str| {
        let re = Regex::new(&format!(r"<{name}>\s*([^<]*?)\s*</{name}>")).ok()?;
        re.captures(content)
            .map(|cap| cap[1].to_string())
            .filter(|value| !value.is_empty())
    };

    let version = tag("version")?;
    Some(match tag("build") {
        Some(build) => format!("{version}.{build}"),
        None => version,
    })
}
