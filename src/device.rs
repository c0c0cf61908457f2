// src/device.rs
use std::io::{self, Read, Write};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use serialport::{ClearBuffer, SerialPort};

use crate::commands::*;
use crate::error::Result;
use crate::transfer::Transport;

/// Short so an acknowledgement wait can honour its own deadline.
const READ_TIMEOUT: Duration = Duration::from_millis(20);

/// Keep at most this many unmatched inbound bytes between reads.
const MAX_PENDING: usize = 256;

/// A byte stream to the device.
pub trait Port: Read + Write + Send {
    /// Throw away inbound bytes that arrived before the next command.
    fn discard_input(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Port for Box<dyn SerialPort> {
    fn discard_input(&mut self) -> io::Result<()> {
        self.clear(ClearBuffer::Input).map_err(io::Error::from)
    }
}

pub struct SerialTransport<P = Box<dyn SerialPort>> {
    port: P,
    pending: Vec<u8>,
}

impl SerialTransport {
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(READ_TIMEOUT)
            .open()?;
        Ok(Self::from_port(port))
    }
}

impl<P: Port> SerialTransport<P> {
    pub fn from_port(port: P) -> Self {
        Self {
            port,
            pending: Vec::new(),
        }
    }

    pub fn into_inner(self) -> P {
        self.port
    }

    fn wait_ack(&mut self, cmd: u8, timeout: Duration) -> bool {
        let started = Instant::now();
        let mut buf = [0u8; 64];

        while started.elapsed() < timeout {
            match self.port.read(&mut buf) {
                Ok(0) => thread::sleep(Duration::from_millis(1)),
                Ok(n) => {
                    self.pending.extend_from_slice(&buf[..n]);
                    if let Some(ack) = extract_acks(&self.pending).into_iter().find(|a| a.cmd == cmd) {
                        debug!(
                            "ack for 0x{:02X} status 0x{:02X} after {:?}",
                            cmd,
                            ack.status,
                            started.elapsed()
                        );
                        self.pending.clear();
                        return ack.confirms(cmd);
                    }
                    if self.pending.len() > MAX_PENDING {
                        let excess = self.pending.len() - MAX_PENDING;
                        self.pending.drain(..excess);
                    }
                }
                Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {}
                Err(e) => {
                    warn!("read failed while waiting for 0x{:02X}: {}", cmd, e);
                    return false;
                }
            }
        }

        debug!("ack timeout for 0x{:02X} after {:?}", cmd, timeout);
        false
    }
}

impl<P: Port> Transport for SerialTransport<P> {
    fn write_packet(&mut self, packet: &[u8]) -> Result<()> {
        self.port.write_all(&to_report(packet))?;
        self.port.flush()?;
        Ok(())
    }

    fn write_packet_and_wait_ack(&mut self, cmd: u8, packet: &[u8], timeout: Duration) -> bool {
        if let Err(e) = self.port.discard_input() {
            debug!("could not discard stale input: {}", e);
        }
        self.pending.clear();

        if let Err(e) = self.write_packet(packet) {
            warn!("write of 0x{:02X} failed: {}", cmd, e);
            return false;
        }
        self.wait_ack(cmd, timeout)
    }
}
