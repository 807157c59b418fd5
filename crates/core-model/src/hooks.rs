//! Collaborators the editor calls out to.
//!
//! All of them observe or supply data; none receives a handle to the editor, so they cannot
//! mutate editor state.

use core_render::LineRenderer;

/// Candidate source for trigger-completion.
///
/// Stateful across repeated triggers (cycles candidates); `reset` is called on the first
/// non-completion action after a completion.
pub trait Completer {
    fn complete(&mut self, prefix: &str) -> Option<String>;
    fn reset(&mut self) {}
}

pub trait WindowNavigator {
    /// Digit as typed after the alt prefix (`0..=9`).
    fn switch_to(&mut self, index: u8);
    fn next(&mut self);
    fn previous(&mut self);
}

pub trait ActivityObserver {
    /// A read timed out with no key.
    fn on_idle(&mut self) {}
    /// A printable, non-command character was just inserted.
    fn on_activity(&mut self) {}
}

/// No-op collaborator for every seam.
#[derive(Debug, Default, Clone, Copy)]
pub struct Detached;

impl Completer for Detached {
    fn complete(&mut self, _prefix: &str) -> Option<String> {
        None
    }
}

impl WindowNavigator for Detached {
    fn switch_to(&mut self, _index: u8) {}
    fn next(&mut self) {}
    fn previous(&mut self) {}
}

impl ActivityObserver for Detached {}

/// Borrowed collaborators for one `read_line` call.
pub struct EditorHooks<'a> {
    pub renderer: &'a mut dyn LineRenderer,
    /// Used when the line starts with the command sigil.
    pub commands: &'a mut dyn Completer,
    /// Used otherwise (participant names and similar).
    pub contextual: &'a mut dyn Completer,
    pub windows: &'a mut dyn WindowNavigator,
    pub activity: &'a mut dyn ActivityObserver,
}

impl<'a> EditorHooks<'a> {
    pub fn new(
        renderer: &'a mut dyn LineRenderer,
        commands: &'a mut dyn Completer,
        contextual: &'a mut dyn Completer,
        windows: &'a mut dyn WindowNavigator,
        activity: &'a mut dyn ActivityObserver,
    ) -> Self {
        Self {
            renderer,
            commands,
            contextual,
            windows,
            activity,
        }
    }
}
