//! Delivery of a matrix configuration: prepare, paced chunk stream, finish.

use std::thread;
use std::time::Duration;

use log::{debug, warn};

use crate::commands::*;
use crate::error::Result;
use crate::matrix::MatrixConfig;

/// The link to the device. Callers hold the arbiter permit while using it.
pub trait Transport: Send {
    /// Send without waiting for an acknowledgement.
    fn write_packet(&mut self, packet: &[u8]) -> Result<()>;

    /// Send and wait up to `timeout` for a positive acknowledgement of `cmd`.
    ///
    /// A timeout, a mismatched acknowledgement and a failed write all yield `false`.
    fn write_packet_and_wait_ack(&mut self, cmd: u8, packet: &[u8], timeout: Duration) -> bool;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write_packet(&mut self, packet: &[u8]) -> Result<()> {
        (**self).write_packet(packet)
    }

    fn write_packet_and_wait_ack(&mut self, cmd: u8, packet: &[u8], timeout: Duration) -> bool {
        (**self).write_packet_and_wait_ack(cmd, packet, timeout)
    }
}

fn send_with_retry<T: Transport + ?Sized>(
    transport: &mut T,
    cmd: u8,
    packet: &[u8],
    timeout: Duration,
) -> bool {
    for attempt in 1..=MAX_ATTEMPTS {
        if transport.write_packet_and_wait_ack(cmd, packet, timeout) {
            return true;
        }
        debug!("no ack for 0x{:02X} (attempt {}/{})", cmd, attempt, MAX_ATTEMPTS);
    }
    warn!("0x{:02X} unacknowledged after {} attempts", cmd, MAX_ATTEMPTS);
    false
}

/// Push a full configuration to the device.
///
/// Returns `true` only once the device has acknowledged the finish command.
pub fn send_config<T: Transport + ?Sized>(
    transport: &mut T,
    config: &MatrixConfig,
    pacing: Duration,
) -> bool {
    let data = config.to_bytes();

    // Without a prepared receiver the chunks would be dropped anyway.
    if !send_with_retry(transport, CMD_PREPARE, &build_packet(CMD_PREPARE, &[]), ACK_TIMEOUT_SHORT) {
        return false;
    }

    for (index, chunk) in data.chunks(CHUNK_SIZE).enumerate() {
        let packet = transport_chunk(index as u8, chunk);
        if let Err(e) = transport.write_packet(&packet) {
            debug!("chunk {} write failed: {}", index, e);
        }
        if !pacing.is_zero() {
            thread::sleep(pacing);
        }
    }
    debug!("streamed {} bytes in {} chunks", data.len(), data.len().div_ceil(CHUNK_SIZE));

    send_with_retry(transport, CMD_FINISH, &build_packet(CMD_FINISH, &[]), ACK_TIMEOUT_LONG)
}

pub fn set_state<T: Transport + ?Sized>(transport: &mut T, on: bool) -> bool {
    transport.write_packet_and_wait_ack(CMD_SET_STATE, &crate::commands::set_state(on), ACK_TIMEOUT_SHORT)
}

pub fn set_intelligent<T: Transport + ?Sized>(transport: &mut T, level: u8) -> bool {
    transport.write_packet_and_wait_ack(CMD_INTELLIGENT, &intelligent(level), ACK_TIMEOUT_SHORT)
}
