//! Terminal input plumbing: crossterm decoding, the blocking input thread, and the channel-backed
//! `KeySource` the line editor reads from.

mod key_token;
mod thread;

pub use thread::{InputShutdown, spawn_input_thread};

use core_events::{INPUT_CHANNEL_CAP, InputError, InputEvent, KeySource};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// Bounded channel sized for the input thread.
pub fn input_channel() -> (Sender<InputEvent>, Receiver<InputEvent>) {
    crossbeam_channel::bounded(INPUT_CHANNEL_CAP)
}

/// `KeySource` over the receiving end of the input channel.
pub struct ChannelKeySource {
    rx: Receiver<InputEvent>,
}

impl ChannelKeySource {
    pub fn new(rx: Receiver<InputEvent>) -> Self {
        Self { rx }
    }
}

impl KeySource for ChannelKeySource {
    fn read_event(&mut self, timeout: Option<Duration>) -> Result<Option<InputEvent>, InputError> {
        match timeout {
            None => self
                .rx
                .recv()
                .map(Some)
                .map_err(|_| InputError::Disconnected),
            Some(t) => match self.rx.recv_timeout(t) {
                Ok(ev) => Ok(Some(ev)),
                Err(RecvTimeoutError::Timeout) => Ok(None),
                Err(RecvTimeoutError::Disconnected) => Err(InputError::Disconnected),
            },
        }
    }
}
