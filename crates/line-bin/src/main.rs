//! inputline entrypoint: a single-line chat shell around `LineEditor`.
use anyhow::Result;
use clap::Parser;
use core_config::load_from;
use core_events::{InputError, InputTelemetry, KeyCode, KeyEvent, KeyModifiers};
use core_input::{ChannelKeySource, InputShutdown, input_channel, spawn_input_thread};
use core_model::{EditorHooks, LineEditor, LineRead};
use core_render::TerminalLineRenderer;
use core_terminal::{CrosstermBackend, TerminalBackend, enter_guard};
use std::fmt;
use std::io::{Stdout, stdout};
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::thread::JoinHandle;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

mod session;

use session::{Outcome, Session};

const LOG_FILE: &str = "inputline.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "inputline", version, about = "Single-line terminal chat input")]
struct Args {
    /// Optional configuration file path (overrides discovery of `inputline.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownReason {
    CtrlC,
    CommandQuit,
    InputClosed,
}

impl ShutdownReason {
    fn as_str(&self) -> &'static str {
        match self {
            ShutdownReason::CtrlC => "ctrl_c",
            ShutdownReason::CommandQuit => "command_quit",
            ShutdownReason::InputClosed => "input_closed",
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join(LOG_FILE);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Global subscriber already installed; dropping the guard shuts the writer down.
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

struct Runtime {
    editor: LineEditor,
    session: Session,
    renderer: TerminalLineRenderer<Stdout>,
    source: ChannelKeySource,
    input_thread: Option<JoinHandle<()>>,
    input_shutdown: InputShutdown,
}

impl Runtime {
    fn run(&mut self) -> Result<ShutdownReason> {
        self.repaint_all()?;
        let span = tracing::debug_span!(target: "runtime", "event_loop");
        let _enter = span.enter();

        loop {
            let read = {
                let mut hooks = EditorHooks::new(
                    &mut self.renderer,
                    &mut self.session.commands,
                    &mut self.session.participants,
                    &mut self.session.windows,
                    &mut self.session.presence,
                );
                self.editor.read_line(&mut self.source, &mut hooks)
            };
            match read {
                Ok(LineRead::Pending) => {}
                Ok(LineRead::Submitted(line)) => {
                    self.editor.history_append(&line);
                    match self.session.submit(&line) {
                        Outcome::Continue => {}
                        Outcome::Quit => return Ok(ShutdownReason::CommandQuit),
                        Outcome::Password => self.capture_password()?,
                    }
                }
                Ok(LineRead::Unhandled(key)) => {
                    if is_ctrl_c(&key) {
                        return Ok(ShutdownReason::CtrlC);
                    }
                }
                Ok(LineRead::Resized { cols, rows }) => {
                    self.session.resize(cols, rows);
                    self.renderer
                        .set_geometry(self.session.input_row(), cols as usize);
                }
                Err(InputError::Disconnected) => return Ok(ShutdownReason::InputClosed),
            }

            if self.session.windows.take_switched() {
                self.editor.reset();
                self.session.mark_dirty();
            }
            if self.session.take_dirty() {
                self.repaint_all()?;
            }
        }
    }

    fn capture_password(&mut self) -> Result<()> {
        self.session.note("enter password (hidden), Enter to finish");
        self.repaint_all()?;
        let max = self.editor.config().password_max_length;
        let secret = self
            .editor
            .get_masked_line(&mut self.source, &mut self.renderer, max)?;
        self.session
            .note(format!("password captured ({} chars)", secret.chars().count()));
        Ok(())
    }

    /// Transcript and status first, then the input line so the hardware cursor ends up there.
    fn repaint_all(&mut self) -> Result<()> {
        self.session.paint(self.renderer.get_mut())?;
        self.editor.redraw(&mut self.renderer);
        Ok(())
    }

    fn shutdown(&mut self, reason: ShutdownReason) {
        info!(target: "runtime.shutdown", %reason, stage = "begin", "shutdown_stage");
        self.input_shutdown.signal();
        if let Some(handle) = self.input_thread.take() {
            if handle.join().is_err() {
                error!(target: "runtime.shutdown", %reason, "input_thread_panicked");
            }
        }
        let telemetry = InputTelemetry::snapshot();
        info!(
            target: "runtime.shutdown",
            %reason,
            stage = "complete",
            keypresses = telemetry.keypresses,
            unmapped = telemetry.unmapped,
            pastes = telemetry.pastes,
            paste_bytes = telemetry.paste_bytes,
            send_failures = telemetry.send_failures,
            "shutdown_stage"
        );
    }
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.mods.contains(KeyModifiers::CTRL)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", "startup");

    let config = load_from(args.config.clone())?;
    let editor_config = config.effective();
    info!(
        target: "runtime.startup",
        config_override = args.config.is_some(),
        config_found = config.raw.is_some(),
        "config_ready"
    );

    let mut backend = CrosstermBackend::new();
    backend.set_title("inputline")?;
    let mut guard = enter_guard(&mut backend)?;
    let (cols, rows) = guard.backend().size()?;

    let (tx, rx) = input_channel();
    let (input_thread, input_shutdown) = spawn_input_thread(tx)?;

    let session = Session::new(cols, rows);
    let renderer = TerminalLineRenderer::new(stdout(), session.input_row(), cols as usize);
    let mut runtime = Runtime {
        editor: LineEditor::new(editor_config, cols as usize),
        session,
        renderer,
        source: ChannelKeySource::new(rx),
        input_thread: Some(input_thread),
        input_shutdown,
    };

    let result = runtime.run();
    let reason = match &result {
        Ok(reason) => *reason,
        Err(e) => {
            error!(target: "runtime", error = %e, "runtime_failed");
            ShutdownReason::InputClosed
        }
    };
    runtime.shutdown(reason);
    guard.release()?;
    result.map(|_| ())
}
