use thiserror::Error;

/// Faults raised by the transport and the settings layer.
///
/// Busy permits and missed acknowledgements are expected outcomes and never
/// show up here; the controller reports those as `false`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("invalid settings: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
