//! Lighting intents as the application stores them, and their dispatch onto a [`Controller`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::controller::Controller;
use crate::matrix::{Color, DEFAULT_PALETTE};
use crate::transfer::Transport;

/// Animation speed; the value is the device's loop time, lower is faster.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Speed {
    Fast,
    #[default]
    Medium,
    Slow,
}

impl Speed {
    pub fn loop_time(self) -> u8 {
        match self {
            Speed::Fast => 5,
            Speed::Medium => 15,
            Speed::Slow => 30,
        }
    }

    /// Unknown names fall back to medium.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "fast" => Speed::Fast,
            "slow" => Speed::Slow,
            _ => Speed::Medium,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LightingMode {
    #[default]
    Smart,
    Off,
    StaticSingle,
    StaticMulti,
    Rotation,
    Breathing,
    Flowing,
}

impl fmt::Display for LightingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LightingMode::Smart => "smart",
            LightingMode::Off => "off",
            LightingMode::StaticSingle => "static_single",
            LightingMode::StaticMulti => "static_multi",
            LightingMode::Rotation => "rotation",
            LightingMode::Breathing => "breathing",
            LightingMode::Flowing => "flowing",
        };
        f.write_str(name)
    }
}

impl FromStr for LightingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "smart" => Ok(LightingMode::Smart),
            "off" => Ok(LightingMode::Off),
            "static_single" => Ok(LightingMode::StaticSingle),
            "static_multi" => Ok(LightingMode::StaticMulti),
            "rotation" => Ok(LightingMode::Rotation),
            "breathing" => Ok(LightingMode::Breathing),
            "flowing" => Ok(LightingMode::Flowing),
            other => Err(format!("unknown lighting mode: {}", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct LightingProfile {
    pub mode: LightingMode,
    pub colors: Vec<Color>,
    pub speed: Speed,
    pub brightness: u8,
}

impl Default for LightingProfile {
    fn default() -> Self {
        Self {
            mode: LightingMode::Smart,
            colors: vec![Color::BLUE, Color::RED, Color::GREEN],
            speed: Speed::Medium,
            brightness: 100,
        }
    }
}

impl LightingProfile {
    /// Three colours for the static multi look, padded from the default palette.
    pub fn multi_colors(&self) -> [Color; 3] {
        let mut colors = DEFAULT_PALETTE;
        for (slot, color) in colors.iter_mut().zip(&self.colors) {
            *slot = *color;
        }
        colors
    }
}

/// Map the hottest sensor reading (°C) to a smart level. Unknown (`<= 0` or not finite) maps to 1.
pub fn level_for_temperature(celsius: f32) -> u8 {
    if !celsius.is_finite() || celsius <= 0.0 {
        1
    } else if celsius < 60.0 {
        1
    } else if celsius < 85.0 {
        2
    } else if celsius < 90.0 {
        3
    } else {
        4
    }
}

/// Forwards smart levels to the background worker only when they change.
#[derive(Debug, Default)]
pub struct SmartLevelTracker {
    last: Option<u8>,
}

impl SmartLevelTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the level to submit, if it differs from the last one.
    pub fn update(&mut self, celsius: f32) -> Option<u8> {
        let level = level_for_temperature(celsius);
        if self.last == Some(level) {
            return None;
        }
        self.last = Some(level);
        Some(level)
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl<T: Transport + 'static> Controller<T> {
    /// Apply a stored profile. `celsius` feeds the smart mode's initial level.
    pub fn apply_profile(&self, profile: &LightingProfile, celsius: Option<f32>) -> bool {
        let speed = profile.speed.loop_time();
        let brightness = profile.brightness;

        match profile.mode {
            LightingMode::Smart => {
                self.set_smart_temp_level(level_for_temperature(celsius.unwrap_or(0.0)))
            }
            LightingMode::Off => self.set_off(),
            LightingMode::StaticSingle => {
                let color = profile.colors.first().copied().unwrap_or(Color::WHITE);
                self.set_static_single(color, brightness)
            }
            LightingMode::StaticMulti => self.set_static_multi(profile.multi_colors(), brightness),
            LightingMode::Rotation => self.set_rotation(&profile.colors, speed, brightness),
            LightingMode::Breathing => self.set_breathing(&profile.colors, speed, brightness),
            LightingMode::Flowing => self.set_flowing(speed, brightness),
        }
    }
}
