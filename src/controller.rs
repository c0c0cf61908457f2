use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::arbiter::Arbiter;
use crate::commands::{CHUNK_PACING, DEBOUNCE_INTERVAL, FOREGROUND_WAIT};
use crate::debounce::Debouncer;
use crate::error::Result;
use crate::matrix::{Color, MatrixConfig};
use crate::transfer::{self, Transport};

struct Link<T> {
    arbiter: Arbiter<T>,
    pacing: Duration,
}

impl<T: Transport> Link<T> {
    fn set_smart_temp_level(&self, level: u8) -> bool {
        // A user command owns the device; skip this update rather than wait.
        let Some(mut transport) = self.arbiter.acquire_background() else {
            debug!("device busy, skipping smart level {}", level);
            return false;
        };
        if !transfer::set_state(&mut *transport, true) {
            return false;
        }
        transfer::set_intelligent(&mut *transport, level)
    }
}

/// High-level lighting commands for one device.
///
/// Every command returns `false` when the device was busy or did not
/// acknowledge; callers treat both as "not applied, try again".
pub struct Controller<T> {
    link: Arc<Link<T>>,
    debouncer: Debouncer,
}

pub struct ControllerBuilder {
    pacing: Duration,
    debounce: Duration,
}

impl Default for ControllerBuilder {
    fn default() -> Self {
        Self {
            pacing: CHUNK_PACING,
            debounce: DEBOUNCE_INTERVAL,
        }
    }
}

impl ControllerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay after each streamed chunk.
    pub fn chunk_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Minimum spacing between background smart level updates.
    pub fn debounce_interval(mut self, interval: Duration) -> Self {
        self.debounce = interval;
        self
    }

    pub fn build<T: Transport + 'static>(self, transport: T) -> Controller<T> {
        Controller {
            link: Arc::new(Link {
                arbiter: Arbiter::new(transport),
                pacing: self.pacing,
            }),
            debouncer: Debouncer::new(self.debounce),
        }
    }
}

impl<T: Transport + 'static> Controller<T> {
    pub fn new(transport: T) -> Self {
        ControllerBuilder::default().build(transport)
    }

    /// Start the background smart level worker, replacing any running one.
    pub fn start(&self) -> Result<()> {
        let link = self.link.clone();
        self.debouncer
            .start(move |level| link.set_smart_temp_level(level))
    }

    pub fn stop(&self) {
        self.debouncer.stop();
    }

    pub fn is_running(&self) -> bool {
        self.debouncer.is_running()
    }

    pub fn is_busy(&self) -> bool {
        self.link.arbiter.is_held()
    }

    pub fn set_flowing(&self, speed: u8, brightness: u8) -> bool {
        self.apply("flowing", brightness, |config| {
            config.set_streamer();
            config.loop_time = speed;
        })
    }

    pub fn set_rotation(&self, colors: &[Color], speed: u8, brightness: u8) -> bool {
        self.apply("rotation", brightness, |config| {
            config.set_rotate(colors);
            config.loop_time = speed;
        })
    }

    pub fn set_breathing(&self, colors: &[Color], speed: u8, brightness: u8) -> bool {
        self.apply("breathing", brightness, |config| {
            config.set_breathe(colors);
            config.loop_time = speed;
        })
    }

    pub fn set_static_single(&self, color: Color, brightness: u8) -> bool {
        self.apply("static single", brightness, |config| config.set_pure(color))
    }

    pub fn set_static_multi(&self, colors: [Color; 3], brightness: u8) -> bool {
        self.apply("static multi", brightness, |config| {
            config.set_multicolor(&colors)
        })
    }

    pub fn set_off(&self) -> bool {
        let Some(mut transport) = self.link.arbiter.acquire_foreground(FOREGROUND_WAIT) else {
            warn!("device busy, lights not switched off");
            return false;
        };
        transfer::set_state(&mut *transport, false)
    }

    /// Switch the device to its temperature-driven mode at `level`.
    ///
    /// Never waits for the device: if a user command holds it, this returns `false`.
    pub fn set_smart_temp_level(&self, level: u8) -> bool {
        self.link.set_smart_temp_level(level)
    }

    /// Hand `level` (1..=4) to the background worker. Out-of-range levels and
    /// levels arriving while the queue is full are dropped.
    pub fn async_set_smart_temp_level(&self, level: u8) {
        self.debouncer.submit(level);
    }

    fn apply<F>(&self, effect: &str, brightness: u8, paint: F) -> bool
    where
        F: FnOnce(&mut MatrixConfig),
    {
        let Some(mut transport) = self.link.arbiter.acquire_foreground(FOREGROUND_WAIT) else {
            warn!("device busy, {} not applied", effect);
            return false;
        };

        let mut config = MatrixConfig::new();
        paint(&mut config);
        config.light_scale = brightness;

        if !transfer::send_config(&mut *transport, &config, self.link.pacing) {
            warn!("{} configuration not acknowledged", effect);
            return false;
        }
        // A configuration without the power state does nothing visible.
        transfer::set_state(&mut *transport, true)
    }
}
