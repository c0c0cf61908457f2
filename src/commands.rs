// src/commands.rs

use std::time::Duration;

pub const SYNC1: u8 = 0x5A;
pub const SYNC2: u8 = 0xA5;

pub const CMD_PREPARE: u8 = 0x41;
pub const CMD_TRANSPORT: u8 = 0x47;
pub const CMD_FINISH: u8 = 0x43;
pub const CMD_SET_STATE: u8 = 0x46;
pub const CMD_INTELLIGENT: u8 = 0x44;

/// Fan telemetry frames share the sync bytes with acknowledgements.
pub const CMD_FAN_TELEMETRY: u8 = 0xEF;

pub const ACK_OK: u8 = 0x01;

pub const CHUNK_SIZE: usize = 10;
pub const MAX_ATTEMPTS: usize = 3;

pub const ACK_TIMEOUT_SHORT: Duration = Duration::from_millis(300);
pub const ACK_TIMEOUT_LONG: Duration = Duration::from_millis(600);
pub const CHUNK_PACING: Duration = Duration::from_millis(3);
pub const FOREGROUND_WAIT: Duration = Duration::from_secs(1);
pub const DEBOUNCE_INTERVAL: Duration = Duration::from_secs(2);

pub const REPORT_ID: u8 = 0x02;
pub const REPORT_LEN: usize = 32;

/// Frame a command: `[5A A5 cmd len payload.. checksum]`.
///
/// `len` counts the command and length bytes themselves, and the checksum is
/// the wrapping sum of everything between the sync bytes and itself.
pub fn build_packet(cmd: u8, payload: &[u8]) -> Vec<u8> {
    let content_len = 2 + payload.len();

    let mut packet = Vec::with_capacity(content_len + 3);
    packet.push(SYNC1);
    packet.push(SYNC2);
    packet.push(cmd);
    packet.push(content_len as u8);
    packet.extend_from_slice(payload);

    let checksum = checksum(&packet[2..]);
    packet.push(checksum);
    packet
}

pub fn checksum(content: &[u8]) -> u8 {
    content.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

pub fn set_state(on: bool) -> Vec<u8> {
    build_packet(CMD_SET_STATE, &[on as u8])
}

pub fn intelligent(level: u8) -> Vec<u8> {
    build_packet(CMD_INTELLIGENT, &[level])
}

pub fn transport_chunk(index: u8, chunk: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(chunk.len() + 1);
    payload.push(index);
    payload.extend_from_slice(chunk);
    build_packet(CMD_TRANSPORT, &payload)
}

/// Wrap a packet into a fixed-size output report (report id, packet, zero padding).
pub fn to_report(packet: &[u8]) -> Vec<u8> {
    let mut report = vec![0u8; REPORT_LEN.max(packet.len() + 1)];
    report[0] = REPORT_ID;
    report[1..=packet.len()].copy_from_slice(packet);
    report
}

/// A frame received from the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub cmd: u8,
    pub status: u8,
}

impl Ack {
    pub fn confirms(&self, cmd: u8) -> bool {
        self.cmd == cmd && self.status == ACK_OK
    }
}

/// Pull every acknowledgement frame out of a raw inbound buffer.
///
/// Telemetry frames and truncated frames are skipped.
pub fn extract_acks(buf: &[u8]) -> Vec<Ack> {
    let mut acks = Vec::new();
    if buf.len() < 5 {
        return acks;
    }

    let mut i = 0;
    while i + 4 < buf.len() {
        if buf[i] != SYNC1 || buf[i + 1] != SYNC2 {
            i += 1;
            continue;
        }

        let total = buf[i + 3] as usize + 3;
        if i + total > buf.len() {
            i += 1;
            continue;
        }

        let cmd = buf[i + 2];
        if cmd != CMD_FAN_TELEMETRY {
            acks.push(Ack {
                cmd,
                status: buf[i + 4],
            });
        }
        i += total;
    }
    acks
}
