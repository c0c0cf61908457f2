//! In-memory model of the device's lighting matrix and the patterns painted onto it.

use serde::{Deserialize, Serialize};

pub const GROUP_COUNT: usize = 10;
pub const UNITS_PER_GROUP: usize = 10;
pub const GROUP_LEN: usize = UNITS_PER_GROUP * 3;
pub const HEADER_LEN: usize = 6;
pub const CONFIG_LEN: usize = HEADER_LEN + GROUP_COUNT * GROUP_LEN;

pub const VERSION: [u8; 2] = [0, 2];

/// Groups that carry the animated ring on the device.
const ACTIVE_GROUPS: usize = 6;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const BLUE: Color = Color::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

pub const DEFAULT_PALETTE: [Color; 3] = [Color::RED, Color::GREEN, Color::BLUE];

/// One physical LED segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ColorGroup {
    pub units: [Color; UNITS_PER_GROUP],
}

impl ColorGroup {
    /// Out-of-range slots are ignored.
    pub fn set(&mut self, index: usize, color: Color) {
        if let Some(unit) = self.units.get_mut(index) {
            *unit = color;
        }
    }

    pub fn clear(&mut self) {
        self.units = [Color::BLACK; UNITS_PER_GROUP];
    }

    pub fn write_bytes(&self, out: &mut [u8]) {
        for (unit, rgb) in self.units.iter().zip(out.chunks_exact_mut(3)) {
            rgb.copy_from_slice(&[unit.r, unit.g, unit.b]);
        }
    }
}

/// Full lighting state delivered in one prepare/transport/finish cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatrixConfig {
    pub version: [u8; 2],
    pub loop_start: u8,
    pub loop_end: u8,
    pub loop_time: u8,
    pub light_scale: u8,
    pub groups: [ColorGroup; GROUP_COUNT],
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            version: VERSION,
            loop_start: 0,
            loop_end: 1,
            loop_time: 15,
            light_scale: 100,
            groups: [ColorGroup::default(); GROUP_COUNT],
        }
    }
}

impl MatrixConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed-size wire image: 6 header bytes then every group, unused slots zeroed.
    pub fn to_bytes(&self) -> [u8; CONFIG_LEN] {
        let mut buf = [0u8; CONFIG_LEN];
        buf[..HEADER_LEN].copy_from_slice(&[
            self.version[0],
            self.version[1],
            self.loop_start,
            self.loop_end,
            self.loop_time,
            self.light_scale,
        ]);
        for (group, out) in self
            .groups
            .iter()
            .zip(buf[HEADER_LEN..].chunks_exact_mut(GROUP_LEN))
        {
            group.write_bytes(out);
        }
        buf
    }

    fn clear(&mut self) {
        for group in self.groups.iter_mut() {
            group.clear();
        }
    }

    /// Six-colour gradient running across the ring.
    pub fn set_streamer(&mut self) {
        self.loop_start = 0;
        self.loop_end = 5;
        self.clear();

        let gradient = [
            Color::new(0, 0, 255),
            Color::new(0, 127, 127),
            Color::new(0, 255, 0),
            Color::new(127, 127, 0),
            Color::new(255, 0, 0),
            Color::new(127, 0, 127),
        ];

        for row in 0..3 {
            for col in 0..ACTIVE_GROUPS {
                let color = gradient[(col + row) % gradient.len()];
                self.groups[row].set(col, color);
                self.groups[row + 3].set(col, color);
            }
        }
    }

    /// Each colour is shifted one slot per group so the ring appears to spin.
    pub fn set_rotate(&mut self, colors: &[Color]) {
        let colors = or_default_palette(colors);
        self.loop_start = 0;
        self.loop_end = 5;
        self.clear();

        for (i, group) in self.groups.iter_mut().take(ACTIVE_GROUPS).enumerate() {
            for (ci, color) in colors.iter().enumerate() {
                let slot = (ACTIVE_GROUPS + ci - i) % ACTIVE_GROUPS;
                group.set(slot, *color);
            }
        }
    }

    /// Dark and lit frames interleave; the device fades between them.
    pub fn set_breathe(&mut self, colors: &[Color]) {
        let colors: &[Color] = if colors.is_empty() {
            &[Color::BLUE]
        } else {
            colors
        };
        self.loop_end = (colors.len() * 2 - 1).min(UNITS_PER_GROUP - 1) as u8;
        self.clear();

        let max_units = colors.len() * 2;
        for group in self.groups.iter_mut() {
            for j in (1..max_units.min(UNITS_PER_GROUP)).step_by(2) {
                group.set(j, colors[(j / 2) % colors.len()]);
            }
        }
    }

    pub fn set_pure(&mut self, color: Color) {
        self.loop_end = 0;
        self.clear();
        for group in self.groups.iter_mut() {
            group.set(0, color);
        }
    }

    /// Up to three colours, each lighting one group and its mirror three groups on.
    pub fn set_multicolor(&mut self, colors: &[Color]) {
        let colors = or_default_palette(colors);
        self.loop_start = 0;
        self.loop_end = 0;
        self.clear();

        for (j, color) in colors.iter().take(3).enumerate() {
            self.groups[j].set(0, *color);
            self.groups[j + 3].set(0, *color);
        }
    }
}

fn or_default_palette(colors: &[Color]) -> &[Color] {
    if colors.is_empty() {
        &DEFAULT_PALETTE
    } else {
        colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_length_is_fixed() {
        let mut config = MatrixConfig::new();
        assert_eq!(config.to_bytes().len(), CONFIG_LEN);
        config.set_breathe(&[Color::RED; 6]);
        assert_eq!(config.to_bytes().len(), 306);
    }

    #[test]
    fn header_layout() {
        let mut config = MatrixConfig::new();
        config.loop_time = 30;
        config.light_scale = 42;
        config.set_rotate(&[]);
        assert_eq!(&config.to_bytes()[..6], &[0, 2, 0, 5, 30, 42]);
    }

    #[test]
    fn group_slot_out_of_range_is_ignored() {
        let mut group = ColorGroup::default();
        group.set(UNITS_PER_GROUP, Color::RED);
        assert_eq!(group, ColorGroup::default());
    }

    #[test]
    fn streamer_rows_are_rotations() {
        let mut config = MatrixConfig::new();
        config.set_streamer();
        assert_eq!(config.groups[0].units[1], config.groups[1].units[0]);
        assert_eq!(config.groups[1].units[1], config.groups[2].units[0]);
        assert_eq!(config.groups[0].units[0], Color::BLUE);
        assert_eq!(config.groups[2].units[5], Color::new(0, 127, 127));
        for row in 0..3 {
            assert_eq!(config.groups[row], config.groups[row + 3]);
        }
        assert_eq!(config.groups[6], ColorGroup::default());
        assert_eq!(config.groups[0].units[6], Color::BLACK);
    }
}
