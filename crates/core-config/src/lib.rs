//! Configuration loading and parsing.
//!
//! Parses `inputline.toml` (or an override path provided by the binary). Every field is optional;
//! absent sections fall back to defaults and unknown fields are ignored. A file that fails to parse
//! is reported once with `warn!` and replaced by defaults, so a bad config never blocks startup.
//!
//! The raw parsed values are kept in `ConfigFile`; `Config::effective` clamps them into the
//! `EditorConfig` the editor is built from, logging each clamp under the `config` target.

use anyhow::Result;
use core_state::HISTORY_CAPACITY_DEFAULT;
use core_text::{DEFAULT_CAPACITY, MIN_CAPACITY};
use serde::Deserialize;
use std::{fs, path::PathBuf, time::Duration};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "inputline.toml";
pub const DEFAULT_SIGIL: char = '/';
pub const DEFAULT_ESCAPE_DELAY_MS: u64 = 25;
pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_PASSWORD_MAX: usize = 64;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BufferSection {
    pub capacity: usize,
}

impl Default for BufferSection {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistorySection {
    pub capacity: usize,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            capacity: HISTORY_CAPACITY_DEFAULT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputSection {
    /// Window after a bare escape during which the next key forms an alt chord.
    pub escape_delay_ms: u64,
    /// Read timeout driving idle notifications; 0 blocks.
    pub idle_timeout_ms: u64,
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            escape_delay_ms: DEFAULT_ESCAPE_DELAY_MS,
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompletionSection {
    pub sigil: String,
}

impl Default for CompletionSection {
    fn default() -> Self {
        Self {
            sigil: DEFAULT_SIGIL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PasswordSection {
    pub max_length: usize,
}

impl Default for PasswordSection {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_PASSWORD_MAX,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub buffer: BufferSection,
    pub history: HistorySection,
    pub input: InputSection,
    pub completion: CompletionSection,
    pub password: PasswordSection,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Raw file text when one was read successfully.
    pub raw: Option<String>,
    pub file: ConfigFile,
}

/// Validated settings consumed by the line editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    pub buffer_capacity: usize,
    pub history_capacity: usize,
    pub escape_delay: Duration,
    /// `None` blocks on reads (no idle notifications).
    pub idle_timeout: Option<Duration>,
    pub sigil: char,
    pub password_max_length: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Config::default().effective()
    }
}

pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("inputline").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                file,
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Clamp raw values into editor settings.
    pub fn effective(&self) -> EditorConfig {
        let f = &self.file;

        let buffer_capacity = f.buffer.capacity.max(MIN_CAPACITY);
        if buffer_capacity != f.buffer.capacity {
            info!(target: "config", field = "buffer.capacity", raw = f.buffer.capacity, clamped = buffer_capacity, "config_clamped");
        }

        let history_capacity = f.history.capacity.max(1);
        if history_capacity != f.history.capacity {
            info!(target: "config", field = "history.capacity", raw = f.history.capacity, clamped = history_capacity, "config_clamped");
        }

        let sigil = match f.completion.sigil.chars().next() {
            Some(c) if !c.is_control() && !c.is_whitespace() => c,
            _ => {
                info!(target: "config", field = "completion.sigil", clamped = %DEFAULT_SIGIL, "config_clamped");
                DEFAULT_SIGIL
            }
        };

        let password_max_length = f.password.max_length.max(1);
        if password_max_length != f.password.max_length {
            info!(target: "config", field = "password.max_length", raw = f.password.max_length, clamped = password_max_length, "config_clamped");
        }

        let idle_timeout = match f.input.idle_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };

        EditorConfig {
            buffer_capacity,
            history_capacity,
            escape_delay: Duration::from_millis(f.input.escape_delay_ms),
            idle_timeout,
            sigil,
            password_max_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn capture<F: FnOnce()>(f: F) -> String {
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();
        with_default(subscriber, f);
        let bytes = buffer.lock().expect("log buffer poisoned").clone();
        String::from_utf8(bytes).expect("utf8 log")
    }

    fn load_str(text: &str) -> Config {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(text.as_bytes()).unwrap();
        load_from(Some(tmp.path().to_path_buf())).unwrap()
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(cfg.raw.is_none());
        let eff = cfg.effective();
        assert_eq!(eff.buffer_capacity, DEFAULT_CAPACITY);
        assert_eq!(eff.history_capacity, HISTORY_CAPACITY_DEFAULT);
        assert_eq!(eff.escape_delay, Duration::from_millis(25));
        assert_eq!(eff.idle_timeout, Some(Duration::from_millis(1000)));
        assert_eq!(eff.sigil, '/');
        assert_eq!(eff.password_max_length, 64);
    }

    #[test]
    fn parses_all_sections() {
        let cfg = load_str(
            "[buffer]\ncapacity = 256\n[history]\ncapacity = 5\n\
             [input]\nescape_delay_ms = 40\nidle_timeout_ms = 0\n\
             [completion]\nsigil = \"!\"\n[password]\nmax_length = 12\n",
        );
        assert!(cfg.raw.is_some());
        let eff = cfg.effective();
        assert_eq!(
            eff,
            EditorConfig {
                buffer_capacity: 256,
                history_capacity: 5,
                escape_delay: Duration::from_millis(40),
                idle_timeout: None,
                sigil: '!',
                password_max_length: 12,
            }
        );
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let eff = load_str("[history]\ncapacity = 7\n").effective();
        assert_eq!(eff.history_capacity, 7);
        assert_eq!(eff.buffer_capacity, DEFAULT_CAPACITY);
        assert_eq!(eff.sigil, '/');
    }

    #[test]
    fn parse_error_falls_back_to_defaults_with_warning() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"[buffer\ncapacity = ").unwrap();
        let path = tmp.path().to_path_buf();
        let mut cfg = None;
        let logs = capture(|| cfg = Some(load_from(Some(path)).unwrap()));
        let cfg = cfg.unwrap();
        assert!(cfg.raw.is_none());
        assert_eq!(cfg.effective().buffer_capacity, DEFAULT_CAPACITY);
        assert!(logs.contains("config_parse_failed"), "logs: {logs}");
    }

    #[test]
    fn clamps_are_logged_under_config_target() {
        let cfg = load_str(
            "[buffer]\ncapacity = 1\n[history]\ncapacity = 0\n[completion]\nsigil = \"\"\n",
        );
        let mut eff = None;
        let logs = capture(|| eff = Some(cfg.effective()));
        let eff = eff.unwrap();
        assert_eq!(eff.buffer_capacity, MIN_CAPACITY);
        assert_eq!(eff.history_capacity, 1);
        assert_eq!(eff.sigil, DEFAULT_SIGIL);
        assert!(logs.contains("config_clamped"));
        assert!(logs.contains("config"));
        assert!(logs.contains("buffer.capacity"));
        assert!(logs.contains("history.capacity"));
    }

    #[test]
    fn discover_prefers_named_file() {
        let p = discover();
        assert!(p.ends_with(CONFIG_FILE_NAME));
    }
}
