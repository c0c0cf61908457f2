#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rgb_controller::commands::CMD_TRANSPORT;
use rgb_controller::matrix::CONFIG_LEN;
use rgb_controller::{Error, Result, Transport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Write(Vec<u8>),
    Ack {
        cmd: u8,
        packet: Vec<u8>,
        timeout: Duration,
    },
}

/// Shared view of everything a [`FakeTransport`] was asked to send.
#[derive(Clone, Default)]
pub struct Recorder {
    sent: Arc<Mutex<Vec<Sent>>>,
}

impl Recorder {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn ack_cmds(&self) -> Vec<u8> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Ack { cmd, .. } => Some(cmd),
                Sent::Write(_) => None,
            })
            .collect()
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Write(packet) => Some(packet),
                Sent::Ack { .. } => None,
            })
            .collect()
    }

    /// Reassemble the configuration streamed in transport chunks.
    pub fn streamed_config(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(CONFIG_LEN);
        for packet in self.writes() {
            assert_eq!(packet[2], CMD_TRANSPORT);
            data.extend_from_slice(&packet[5..packet.len() - 1]);
        }
        data
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

type AckPolicy = Box<dyn FnMut(u8) -> bool + Send>;

pub struct FakeTransport {
    recorder: Recorder,
    ack: AckPolicy,
    ack_delay: Duration,
    fail_writes: bool,
}

impl FakeTransport {
    pub fn acking() -> (Self, Recorder) {
        Self::with_acks(|_| true)
    }

    pub fn silent() -> (Self, Recorder) {
        Self::with_acks(|_| false)
    }

    pub fn with_acks(policy: impl FnMut(u8) -> bool + Send + 'static) -> (Self, Recorder) {
        let recorder = Recorder::default();
        let transport = Self {
            recorder: recorder.clone(),
            ack: Box::new(policy),
            ack_delay: Duration::ZERO,
            fail_writes: false,
        };
        (transport, recorder)
    }

    /// Every acknowledgement wait takes this long.
    pub fn ack_delay(mut self, delay: Duration) -> Self {
        self.ack_delay = delay;
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }
}

impl Transport for FakeTransport {
    fn write_packet(&mut self, packet: &[u8]) -> Result<()> {
        self.recorder
            .sent
            .lock()
            .unwrap()
            .push(Sent::Write(packet.to_vec()));
        if self.fail_writes {
            return Err(Error::Io(io::ErrorKind::BrokenPipe.into()));
        }
        Ok(())
    }

    fn write_packet_and_wait_ack(&mut self, cmd: u8, packet: &[u8], timeout: Duration) -> bool {
        self.recorder.sent.lock().unwrap().push(Sent::Ack {
            cmd,
            packet: packet.to_vec(),
            timeout,
        });
        if !self.ack_delay.is_zero() {
            thread::sleep(self.ack_delay);
        }
        (self.ack)(cmd)
    }
}
