//! Blocking input thread.
//!
//! Reads crossterm events on a dedicated OS thread, normalizes them into `InputEvent`s and pushes
//! them into a bounded crossbeam channel. The editor side consumes them through
//! `ChannelKeySource`. The loop polls with a short interval so a shutdown request is observed
//! without waiting for the next keystroke.

use core_events::{
    CHANNEL_SEND_FAILURES, InputEvent, KEYPRESS_TOTAL, PASTE_BYTES, PASTE_EVENTS,
};
use crossbeam_channel::Sender;
use crossterm::event::{self, DisableBracketedPaste, EnableBracketedPaste, Event as CEvent};
use crossterm::execute;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

use crate::key_token::map_key_event;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Requests the input thread to stop at its next poll.
#[derive(Debug, Clone)]
pub struct InputShutdown {
    flag: Arc<AtomicBool>,
}

impl InputShutdown {
    pub fn signal(&self) {
        self.flag.store(true, Ordering::Release);
    }

    fn requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitReason {
    ShutdownSignal,
    ChannelClosed,
    ReadError,
}

impl ExitReason {
    fn as_str(&self) -> &'static str {
        match self {
            ExitReason::ShutdownSignal => "shutdown_signal",
            ExitReason::ChannelClosed => "channel_closed",
            ExitReason::ReadError => "read_error",
        }
    }
}

/// Spawn the input thread. Bracketed paste is enabled for the thread's lifetime.
pub fn spawn_input_thread(sender: Sender<InputEvent>) -> io::Result<(JoinHandle<()>, InputShutdown)> {
    let shutdown = InputShutdown {
        flag: Arc::new(AtomicBool::new(false)),
    };
    let listener = shutdown.clone();
    let handle = thread::Builder::new()
        .name("input".into())
        .spawn(move || run(sender, listener))?;
    Ok((handle, shutdown))
}

fn run(sender: Sender<InputEvent>, shutdown: InputShutdown) {
    info!(target: "input.thread", "input_thread_started");
    if let Err(e) = execute!(io::stdout(), EnableBracketedPaste) {
        debug!(target: "input.thread", error = %e, "bracketed_paste_enable_failed");
    }

    let reason = loop {
        if shutdown.requested() {
            break ExitReason::ShutdownSignal;
        }
        match event::poll(POLL_INTERVAL) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(e) => {
                warn!(target: "input.thread", error = %e, "poll_failed");
                break ExitReason::ReadError;
            }
        }
        let raw = match event::read() {
            Ok(ev) => ev,
            Err(e) => {
                warn!(target: "input.thread", error = %e, "read_failed");
                break ExitReason::ReadError;
            }
        };
        let Some(ev) = translate(raw) else {
            continue;
        };
        if sender.send(ev).is_err() {
            CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
            break ExitReason::ChannelClosed;
        }
    };

    if let Err(e) = execute!(io::stdout(), DisableBracketedPaste) {
        debug!(target: "input.thread", error = %e, "bracketed_paste_disable_failed");
    }
    info!(target: "input.thread", reason = reason.as_str(), "input_thread_stopped");
}

/// Normalize one terminal event; `None` for events the editor ignores (focus, mouse, releases).
pub(crate) fn translate(raw: CEvent) -> Option<InputEvent> {
    match raw {
        CEvent::Key(key) => {
            let mapped = map_key_event(&key)?;
            KEYPRESS_TOTAL.fetch_add(1, Ordering::Relaxed);
            trace!(target: "input.thread", key = %mapped, "keypress");
            Some(InputEvent::Key(mapped))
        }
        CEvent::Resize(w, h) => {
            trace!(target: "input.thread", w, h, "resize");
            Some(InputEvent::Resize(w, h))
        }
        CEvent::Paste(data) => {
            log_paste(&data);
            Some(InputEvent::Paste(data))
        }
        CEvent::FocusGained | CEvent::FocusLost | CEvent::Mouse(_) => None,
    }
}

fn log_paste(data: &str) {
    PASTE_EVENTS.fetch_add(1, Ordering::Relaxed);
    PASTE_BYTES.fetch_add(data.len() as u64, Ordering::Relaxed);
    trace!(target: "input.thread", len = data.len(), "paste");
}
