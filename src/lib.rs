//! RGB lighting protocol engine for a HID fan accessory.
//!
//! Lighting intents become a 306-byte matrix configuration, which is framed,
//! checksummed and streamed to the device in a prepare/transport/finish
//! handshake. User commands and the background temperature updater share the
//! link through a single permit: users wait up to a second for it, background
//! updates only take it when it is free.
//!
//! ```no_run
//! use rgb_controller::{Color, Controller, SerialTransport};
//!
//! fn main() -> rgb_controller::Result<()> {
//!     let controller = Controller::new(SerialTransport::open("/dev/ttyACM0", 115200)?);
//!     controller.start()?;
//!
//!     if !controller.set_static_single(Color::new(255, 0, 0), 80) {
//!         eprintln!("device busy, try again");
//!     }
//!     controller.async_set_smart_temp_level(2);
//!
//!     controller.stop();
//!     Ok(())
//! }
//! ```

pub mod arbiter;
pub mod commands;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod device;
pub mod error;
pub mod matrix;
pub mod profile;
pub mod stats;
pub mod transfer;

pub use controller::{Controller, ControllerBuilder};
pub use device::SerialTransport;
pub use error::{Error, Result};
pub use matrix::{Color, MatrixConfig};
pub use profile::{LightingMode, LightingProfile, Speed};
pub use transfer::Transport;
