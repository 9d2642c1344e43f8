//! Soundboard layout: title, where clips live, and which button plays what.
//!
//! ```toml
//! title = "DJ Khaled Soundbox"
//! sounds_dir = "sounds"
//! volume = 0.8
//!
//! [[buttons]]
//! label = "Lion"
//! clip = "liiiooon.mp3"
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ButtonConfig {
    pub label: String,
    /// File name relative to the sounds directory
    pub clip: String,
}

impl ButtonConfig {
    pub fn new(label: impl Into<String>, clip: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            clip: clip.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SoundboxConfig {
    pub title: String,
    pub sounds_dir: PathBuf,
    pub volume: f32,
    pub buttons: Vec<ButtonConfig>,
}

impl Default for SoundboxConfig {
    fn default() -> Self {
        Self {
            title: "DJ Khaled Soundbox".to_string(),
            sounds_dir: PathBuf::from("sounds"),
            volume: 1.0,
            buttons: vec![
                ButtonConfig::new("Lion", "liiiooon.mp3"),
                ButtonConfig::new("Enjoy Life", "enjoylife.mp3"),
            ],
        }
    }
}

impl SoundboxConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.buttons.is_empty() {
            return Err(anyhow!("At least one button must be configured"));
        }

        if !(0.0..=1.0).contains(&self.volume) {
            return Err(anyhow!("Volume {} is outside 0.0 to 1.0", self.volume));
        }

        let mut seen = HashSet::new();
        for button in &self.buttons {
            if button.label.trim().is_empty() {
                return Err(anyhow!("Button label must not be empty"));
            }
            if button.clip.trim().is_empty() {
                return Err(anyhow!("Button '{}' has no clip", button.label));
            }
            if !seen.insert(button.label.to_lowercase()) {
                return Err(anyhow!("Duplicate button label: {}", button.label));
            }
        }

        Ok(())
    }

    /// Look up a button by its 1-based number or its label, ignoring case.
    pub fn find_button(&self, input: &str) -> Option<&ButtonConfig> {
        let input = input.trim();

        if let Ok(number) = input.parse::<usize>() {
            return number.checked_sub(1).and_then(|i| self.buttons.get(i));
        }

        self.buttons
            .iter()
            .find(|b| b.label.eq_ignore_ascii_case(input))
    }

    /// Button clip if `input` names a button, otherwise `input` itself as a clip name.
    pub fn resolve_clip<'a>(&'a self, input: &'a str) -> &'a str {
        self.find_button(input)
            .map(|b| b.clip.as_str())
            .unwrap_or_else(|| input.trim())
    }
}
