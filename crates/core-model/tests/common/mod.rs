#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_config::EditorConfig;
use core_events::{InputError, InputEvent, KeyCode, KeyEvent, KeySource};
use core_model::{
    ActivityObserver, Completer, EditorHooks, LineEditor, LineRead, WindowNavigator,
};
use core_render::LineRenderer;
use std::collections::VecDeque;
use std::time::Duration;

/// Key source fed from a script. `None` entries simulate a read timeout; an exhausted script
/// reports the source as disconnected.
#[derive(Default)]
pub struct ScriptedSource {
    events: VecDeque<Option<InputEvent>>,
    pub timeouts_requested: Vec<Option<Duration>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: KeyEvent) -> Self {
        self.events.push_back(Some(InputEvent::Key(key)));
        self
    }

    pub fn code(self, code: KeyCode) -> Self {
        self.key(KeyEvent::plain(code))
    }

    pub fn text(mut self, s: &str) -> Self {
        for c in s.chars() {
            self.events.push_back(Some(InputEvent::Key(KeyEvent::char(c))));
        }
        self
    }

    pub fn paste(mut self, s: &str) -> Self {
        self.events.push_back(Some(InputEvent::Paste(s.to_string())));
        self
    }

    pub fn resize(mut self, cols: u16, rows: u16) -> Self {
        self.events.push_back(Some(InputEvent::Resize(cols, rows)));
        self
    }

    pub fn timeout(mut self) -> Self {
        self.events.push_back(None);
        self
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl KeySource for ScriptedSource {
    fn read_event(&mut self, timeout: Option<Duration>) -> Result<Option<InputEvent>, InputError> {
        self.timeouts_requested.push(timeout);
        self.events.pop_front().ok_or(InputError::Disconnected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub line: String,
    pub cursor: usize,
    pub scroll: usize,
}

#[derive(Default)]
pub struct RecordingRenderer {
    pub frames: Vec<Frame>,
}

impl LineRenderer for RecordingRenderer {
    fn draw(&mut self, line: &str, cursor: usize, scroll_offset: usize) {
        self.frames.push(Frame {
            line: line.to_string(),
            cursor,
            scroll: scroll_offset,
        });
    }
}

/// Prefix-cycling completer over a fixed candidate list.
#[derive(Default)]
pub struct CyclingCompleter {
    candidates: Vec<String>,
    prefix: Option<String>,
    next: usize,
    pub calls: Vec<String>,
    pub resets: usize,
}

impl CyclingCompleter {
    pub fn new(candidates: &[&str]) -> Self {
        Self {
            candidates: candidates.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }
}

impl Completer for CyclingCompleter {
    fn complete(&mut self, prefix: &str) -> Option<String> {
        self.calls.push(prefix.to_string());
        let base = self.prefix.get_or_insert_with(|| prefix.to_string()).clone();
        let matches: Vec<&String> = self
            .candidates
            .iter()
            .filter(|c| c.starts_with(&base))
            .collect();
        if matches.is_empty() {
            return None;
        }
        let pick = matches[self.next % matches.len()].clone();
        self.next += 1;
        Some(pick)
    }

    fn reset(&mut self) {
        self.prefix = None;
        self.next = 0;
        self.resets += 1;
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub calls: Vec<String>,
}

impl WindowNavigator for RecordingNavigator {
    fn switch_to(&mut self, index: u8) {
        self.calls.push(format!("switch:{index}"));
    }
    fn next(&mut self) {
        self.calls.push("next".into());
    }
    fn previous(&mut self) {
        self.calls.push("previous".into());
    }
}

#[derive(Default)]
pub struct ActivityCounter {
    pub idle: usize,
    pub activity: usize,
}

impl ActivityObserver for ActivityCounter {
    fn on_idle(&mut self) {
        self.idle += 1;
    }
    fn on_activity(&mut self) {
        self.activity += 1;
    }
}

/// Owns one of every collaborator and lends them to the editor.
#[derive(Default)]
pub struct Harness {
    pub renderer: RecordingRenderer,
    pub commands: CyclingCompleter,
    pub contextual: CyclingCompleter,
    pub windows: RecordingNavigator,
    pub activity: ActivityCounter,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            commands: CyclingCompleter::new(&["/help", "/quit", "/query"]),
            contextual: CyclingCompleter::new(&["bob", "bobby", "alice"]),
            ..Self::default()
        }
    }

    pub fn hooks(&mut self) -> EditorHooks<'_> {
        EditorHooks::new(
            &mut self.renderer,
            &mut self.commands,
            &mut self.contextual,
            &mut self.windows,
            &mut self.activity,
        )
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.renderer.frames.last()
    }
}

pub fn editor(capacity: usize, width: usize) -> LineEditor {
    let config = EditorConfig {
        buffer_capacity: capacity,
        ..EditorConfig::default()
    };
    LineEditor::new(config, width)
}

/// Drain the script, collecting every non-pending outcome.
pub fn run(ed: &mut LineEditor, src: &mut ScriptedSource, h: &mut Harness) -> Vec<LineRead> {
    let mut out = Vec::new();
    while src.remaining() > 0 {
        match ed.read_line(src, &mut h.hooks()) {
            Ok(LineRead::Pending) => {}
            Ok(other) => out.push(other),
            Err(e) => panic!("unexpected input error: {e}"),
        }
    }
    out
}
