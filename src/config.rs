use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::profile::LightingProfile;

pub const SETTINGS_FILE: &str = "rgb_controller.json";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub port: String,
    pub baud_rate: u32,
    pub log_level: String,
    pub log_file: Option<String>,
    pub poll_interval_ms: u64,
    pub profile: LightingProfile,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: 115200,
            log_level: "info".to_string(),
            log_file: None,
            poll_interval_ms: 500,
            profile: LightingProfile::default(),
        }
    }
}

impl Settings {
    /// Missing file gives the defaults; a file that does not parse is an error.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
