//! Background application of temperature-driven levels, at most once per interval.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::error::Result;

pub const QUEUE_CAPACITY: usize = 5;
pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 4;

enum Message {
    Level(u8),
    /// Wakes the worker of the given generation so it can exit.
    Stop(u64),
}

struct Worker {
    generation: u64,
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

pub struct Debouncer {
    sender: SyncSender<Message>,
    receiver: Arc<Mutex<Receiver<Message>>>,
    interval: Duration,
    worker: Mutex<Option<Worker>>,
    generation: AtomicU64,
}

impl Debouncer {
    pub fn new(interval: Duration) -> Self {
        let (sender, receiver) = sync_channel(QUEUE_CAPACITY);
        Self {
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
            interval,
            worker: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Queue a level without blocking. Returns `false` when the level is out
    /// of range or the queue is full; either way the level is dropped.
    pub fn submit(&self, level: u8) -> bool {
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
            debug!("ignoring out-of-range level {}", level);
            return false;
        }
        match self.sender.try_send(Message::Level(level)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!("level queue full, dropping {}", level);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// (Re)start the worker. Any running worker is stopped first.
    pub fn start<F>(&self, apply: F) -> Result<()>
    where
        F: Fn(u8) -> bool + Send + 'static,
    {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(old) = worker.take() {
            old.shutdown(&self.sender);
        }

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let stop = Arc::new(AtomicBool::new(false));
        let thr_stop = stop.clone();
        let thr_receiver = self.receiver.clone();
        let interval = self.interval;

        let handle = thread::Builder::new()
            .name("smart-level".to_string())
            .spawn(move || run(thr_receiver, thr_stop, generation, interval, apply))?;

        *worker = Some(Worker {
            generation,
            stop,
            handle,
        });
        info!("smart level worker started");
        Ok(())
    }

    /// No-op when already stopped.
    pub fn stop(&self) {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(old) = worker.take() {
            old.shutdown(&self.sender);
            info!("smart level worker stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Worker {
    fn shutdown(self, sender: &SyncSender<Message>) {
        self.stop.store(true, Ordering::Release);
        // A full queue means the worker is busy draining; it sees the flag
        // before its next receive.
        let _ = sender.try_send(Message::Stop(self.generation));
        if self.handle.join().is_err() {
            warn!("smart level worker panicked");
        }
    }
}

fn run<F>(
    receiver: Arc<Mutex<Receiver<Message>>>,
    stop: Arc<AtomicBool>,
    generation: u64,
    interval: Duration,
    apply: F,
) where
    F: Fn(u8) -> bool,
{
    let mut last_applied: Option<Instant> = None;

    while !stop.load(Ordering::Acquire) {
        let next = receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recv();

        let level = match next {
            Ok(Message::Level(level)) => level,
            Ok(Message::Stop(target)) if target == generation => break,
            // Left behind by an earlier worker that exited on its flag.
            Ok(Message::Stop(_)) => continue,
            Err(_) => break,
        };

        if last_applied.is_some_and(|at| at.elapsed() < interval) {
            debug!("level {} inside debounce window, dropped", level);
            continue;
        }

        if !apply(level) {
            debug!("level {} not applied", level);
        }
        last_applied = Some(Instant::now());
    }
}
