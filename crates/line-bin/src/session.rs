//! Chat-shell side of the demo: windows with transcripts, the command and participant
//! completers, presence tracking, and painting everything above the input row.

use anyhow::Result;
use core_model::{ActivityObserver, Completer, WindowNavigator};
use core_render::writer::Writer;
use std::io::Write;
use tracing::{debug, info};

pub const COMMANDS: &[&str] = &["/clear", "/close", "/help", "/join", "/password", "/quit"];

/// Idle ticks (read timeouts) before presence flips to away.
const AWAY_AFTER_TICKS: u32 = 60;

/// Cycles through candidates matching the last word of the line.
///
/// The first call fixes the base text; repeated calls keep cycling over the same matches until
/// `reset`.
#[derive(Debug, Default)]
pub struct PrefixCompleter {
    candidates: Vec<String>,
    base: Option<String>,
    next: usize,
}

impl PrefixCompleter {
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
            base: None,
            next: 0,
        }
    }

    pub fn add_candidate(&mut self, candidate: &str) {
        if !self.candidates.iter().any(|c| c == candidate) {
            self.candidates.push(candidate.to_string());
        }
    }
}

impl Completer for PrefixCompleter {
    fn complete(&mut self, prefix: &str) -> Option<String> {
        let base = self.base.get_or_insert_with(|| prefix.to_string());
        let split = base
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        let (head, word) = base.split_at(split);
        let matches: Vec<&String> = self
            .candidates
            .iter()
            .filter(|c| c.starts_with(word))
            .collect();
        if matches.is_empty() {
            return None;
        }
        let pick = matches[self.next % matches.len()];
        self.next += 1;
        Some(format!("{head}{pick}"))
    }

    fn reset(&mut self) {
        self.base = None;
        self.next = 0;
    }
}

#[derive(Debug)]
pub struct Window {
    pub name: String,
    pub transcript: Vec<String>,
}

impl Window {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            transcript: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct Windows {
    list: Vec<Window>,
    active: usize,
    switched: bool,
}

impl Windows {
    pub fn new() -> Self {
        Self {
            list: vec![Window::new("status")],
            active: 0,
            switched: false,
        }
    }

    pub fn active(&self) -> &Window {
        &self.list[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn push_line(&mut self, line: String) {
        self.list[self.active].transcript.push(line);
    }

    pub fn open(&mut self, name: &str) {
        self.list.push(Window::new(name));
        self.select(self.list.len() - 1);
    }

    /// Close the active window; the status window (index 0) stays.
    pub fn close(&mut self) -> bool {
        if self.active == 0 {
            return false;
        }
        self.list.remove(self.active);
        self.select(self.active - 1);
        true
    }

    pub fn clear(&mut self) {
        self.list[self.active].transcript.clear();
    }

    /// Whether the active window changed since the last call.
    pub fn take_switched(&mut self) -> bool {
        std::mem::take(&mut self.switched)
    }

    fn select(&mut self, index: usize) {
        if index < self.list.len() && index != self.active {
            self.active = index;
            self.switched = true;
            debug!(target: "runtime", window = index, "window_switched");
        }
    }
}

impl Default for Windows {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowNavigator for Windows {
    /// Digits 1..9 select windows 1..9 (one-based), 0 selects window 10.
    fn switch_to(&mut self, index: u8) {
        let slot = if index == 0 { 9 } else { index as usize - 1 };
        self.select(slot);
    }

    fn next(&mut self) {
        self.select((self.active + 1) % self.list.len());
    }

    fn previous(&mut self) {
        let n = self.list.len();
        self.select((self.active + n - 1) % n);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceState {
    Active,
    Away,
}

#[derive(Debug)]
pub struct Presence {
    idle_ticks: u32,
    state: PresenceState,
    changed: bool,
}

impl Presence {
    pub fn new() -> Self {
        Self {
            idle_ticks: 0,
            state: PresenceState::Active,
            changed: false,
        }
    }

    pub fn state(&self) -> PresenceState {
        self.state
    }

    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    fn set(&mut self, state: PresenceState) {
        if self.state != state {
            self.state = state;
            self.changed = true;
            info!(target: "runtime", ?state, "presence");
        }
    }
}

impl Default for Presence {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityObserver for Presence {
    fn on_idle(&mut self) {
        self.idle_ticks = self.idle_ticks.saturating_add(1);
        if self.idle_ticks >= AWAY_AFTER_TICKS {
            self.set(PresenceState::Away);
        }
    }

    fn on_activity(&mut self) {
        self.idle_ticks = 0;
        self.set(PresenceState::Active);
    }
}

/// What the runtime should do after a submitted line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
    /// Prompt for a secret with masked capture.
    Password,
}

pub struct Session {
    pub commands: PrefixCompleter,
    pub participants: PrefixCompleter,
    pub windows: Windows,
    pub presence: Presence,
    cols: u16,
    rows: u16,
    dirty: bool,
}

impl Session {
    pub fn new(cols: u16, rows: u16) -> Self {
        let mut windows = Windows::new();
        windows.push_line("type /help for commands".to_string());
        Self {
            commands: PrefixCompleter::new(COMMANDS.iter().copied()),
            participants: PrefixCompleter::new(["alice", "bob", "carol"]),
            windows,
            presence: Presence::new(),
            cols,
            rows,
            dirty: true,
        }
    }

    /// Row of the input line.
    pub fn input_row(&self) -> u16 {
        self.rows.saturating_sub(1)
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.dirty = true;
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether anything above the input row needs repainting. Consumes window-switch and
    /// presence change notifications.
    pub fn take_dirty(&mut self) -> bool {
        let switched = self.windows.take_switched();
        let presence = self.presence.take_changed();
        std::mem::take(&mut self.dirty) || switched || presence
    }

    pub fn note(&mut self, line: impl Into<String>) {
        self.windows.push_line(line.into());
        self.dirty = true;
    }

    /// Handle a submitted line.
    pub fn submit(&mut self, line: &str) -> Outcome {
        self.dirty = true;
        let Some(command) = line.strip_prefix('/') else {
            if !line.is_empty() {
                self.windows.push_line(format!("<me> {line}"));
            }
            return Outcome::Continue;
        };
        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or("");
        debug!(target: "runtime", command = name, "command");
        match name {
            "quit" => return Outcome::Quit,
            "password" => return Outcome::Password,
            "help" => self.windows.push_line(format!("commands: {}", COMMANDS.join(" "))),
            "clear" => self.windows.clear(),
            "join" => match parts.next() {
                Some(target) => {
                    self.participants.add_candidate(target);
                    self.windows.open(target);
                }
                None => self.windows.push_line("usage: /join <name>".to_string()),
            },
            "close" => {
                if !self.windows.close() {
                    self.windows.push_line("the status window cannot be closed".to_string());
                }
            }
            _ => self.windows.push_line(format!("unknown command: /{name}")),
        }
        Outcome::Continue
    }

    /// Paint the transcript and status line (everything but the input row).
    pub fn paint<W: Write>(&self, out: &mut W) -> Result<()> {
        let mut w = Writer::new();
        let status_row = self.rows.saturating_sub(2);
        let width = self.cols as usize;
        let transcript = &self.windows.active().transcript;
        let visible = status_row as usize;
        let skip = transcript.len().saturating_sub(visible);
        for row in 0..status_row {
            w.move_to(0, row);
            w.clear_line();
            if let Some(line) = transcript.get(skip + row as usize) {
                w.print(line.chars().take(width).collect::<String>());
            }
        }
        if self.rows >= 2 {
            w.move_to(0, status_row);
            w.clear_line();
            w.print(self.status_text().chars().take(width).collect::<String>());
        }
        w.flush_to(out)
    }

    fn status_text(&self) -> String {
        let presence = match self.presence.state() {
            PresenceState::Active => "",
            PresenceState::Away => " (away)",
        };
        format!(
            "[{}:{}]{presence}",
            self.windows.active_index() + 1,
            self.windows.active().name
        )
    }
}
