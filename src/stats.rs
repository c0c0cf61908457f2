use sysinfo::Components;

pub struct Stats {
    components: Components,
}

impl Stats {
    pub fn new() -> Self {
        Self {
            components: Components::new_with_refreshed_list(),
        }
    }

    /// Hottest sensor reading in °C, if the platform exposes any.
    pub fn max_temperature(&mut self) -> Option<f32> {
        self.components.refresh();
        self.components
            .iter()
            .map(|c| c.temperature())
            .filter(|t| t.is_finite() && *t > 0.0)
            .fold(None, |max: Option<f32>, t| Some(max.map_or(t, |m| m.max(t))))
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}
