//! TOML manifest listing channels to fetch.
//!
//! ```toml
//! [[channel]]
//! name = "packages"
//! priority = 3.0
//! urls = ["https://deb.example.org/pool/a.deb"]
//!
//! [channel.headers]
//! Authorization = "Bearer ..."
//! ```

use anyhow::{bail, Context, Result};
use cmux_core::naming;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(rename = "channel", default)]
    pub channels: Vec<ChannelSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelSpec {
    pub name: String,
    #[serde(default = "default_priority")]
    pub priority: f64,
    pub urls: Vec<String>,
    /// Extra request headers for every URL of the channel.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_priority() -> f64 {
    1.0
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let data =
            std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::parse(&data).with_context(|| format!("manifest {}", path.display()))
    }

    pub fn parse(data: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(data)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Channel names double as output directories, so they must be non-empty
    /// and distinct after sanitizing.
    fn validate(&self) -> Result<()> {
        if self.channels.is_empty() {
            bail!("no [[channel]] entries");
        }
        let mut seen = HashSet::new();
        for c in &self.channels {
            let dir = naming::sanitize(&c.name);
            if dir.is_empty() {
                bail!("channel name {:?} is not usable as a directory", c.name);
            }
            if !seen.insert(dir) {
                bail!("duplicate channel name {:?}", c.name);
            }
            if !c.priority.is_finite() || c.priority < 0.0 {
                bail!("channel {:?}: priority must be a non-negative number", c.name);
            }
        }
        Ok(())
    }
}
