//! Configuration loading and parsing.
//!
//! Parses `cooked.toml` (or an override path provided by the binary). Every
//! section and field is optional; anything absent takes the console defaults
//! below. Unknown fields are ignored so older binaries accept newer files.
//!
//! ```toml
//! [editing]
//! insert_mode = true
//! [input]
//! processed = true
//! echo = true
//! [history]
//! capacity = 50
//! no_duplicates = false
//! [popup]
//! attributes = 0xF5
//! max_height = 20
//! [log]
//! filter = "info"
//! ```

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{debug, warn};

pub const CONFIG_FILE_NAME: &str = "cooked.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EditingConfig {
    #[serde(default = "EditingConfig::default_insert_mode")]
    pub insert_mode: bool,
}

impl Default for EditingConfig {
    fn default() -> Self {
        Self {
            insert_mode: Self::default_insert_mode(),
        }
    }
}

impl EditingConfig {
    const fn default_insert_mode() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct InputConfig {
    /// Backspace edits and lines end in CRLF.
    #[serde(default = "InputConfig::enabled")]
    pub processed: bool,
    /// Redraw, history and alias expansion.
    #[serde(default = "InputConfig::enabled")]
    pub echo: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            processed: Self::enabled(),
            echo: Self::enabled(),
        }
    }
}

impl InputConfig {
    const fn enabled() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    #[serde(default = "HistoryConfig::default_capacity")]
    pub capacity: usize,
    #[serde(default)]
    pub no_duplicates: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: Self::default_capacity(),
            no_duplicates: false,
        }
    }
}

impl HistoryConfig {
    const fn default_capacity() -> usize {
        50
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PopupConfig {
    /// Legacy attribute word: foreground in the low nibble, background above.
    #[serde(default = "PopupConfig::default_attributes")]
    pub attributes: u16,
    #[serde(default = "PopupConfig::default_max_height")]
    pub max_height: usize,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            attributes: Self::default_attributes(),
            max_height: Self::default_max_height(),
        }
    }
}

impl PopupConfig {
    const fn default_attributes() -> u16 {
        0xF5
    }
    const fn default_max_height() -> usize {
        20
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Used when `RUST_LOG` is unset.
    #[serde(default = "LogConfig::default_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: Self::default_filter(),
        }
    }
}

impl LogConfig {
    fn default_filter() -> String {
        String::from("info")
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub editing: EditingConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub popup: PopupConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Where the file was looked up, whether or not it existed.
    pub path: Option<PathBuf>,
    pub raw: Option<String>,
    pub file: ConfigFile,
}

/// Local `cooked.toml` first, then the platform config dir (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("cooked").join(CONFIG_FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        debug!(target: "config", path = %path.display(), "no config file; using defaults");
        return Ok(Config {
            path: Some(path),
            ..Config::default()
        });
    };
    match parse(&content) {
        Ok(file) => {
            debug!(target: "config", path = %path.display(), "config loaded");
            Ok(Config {
                path: Some(path),
                raw: Some(content),
                file,
            })
        }
        Err(err) => {
            warn!(
                target: "config",
                path = %path.display(),
                error = %err,
                "config parse failed; using defaults"
            );
            Ok(Config {
                path: Some(path),
                ..Config::default()
            })
        }
    }
}

pub fn parse(content: &str) -> Result<ConfigFile> {
    Ok(toml::from_str::<ConfigFile>(content)?)
}

impl Config {
    pub fn history_capacity(&self) -> usize {
        self.file.history.capacity.max(1)
    }

    /// CommandList rows never drop below one.
    pub fn popup_max_height(&self) -> usize {
        self.file.popup.max_height.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
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

    impl Write for LockedWriter<'_> {
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

    fn load_str(content: &str) -> Config {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), content).unwrap();
        load_from(Some(tmp.path().to_path_buf())).unwrap()
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert_eq!(cfg.file, ConfigFile::default());
        assert!(cfg.raw.is_none());
        assert!(cfg.file.editing.insert_mode);
        assert!(cfg.file.input.processed && cfg.file.input.echo);
        assert_eq!(cfg.file.history.capacity, 50);
        assert_eq!(cfg.file.popup.attributes, 0xF5);
        assert_eq!(cfg.file.popup.max_height, 20);
        assert_eq!(cfg.file.log.filter, "info");
    }

    #[test]
    fn parses_every_section() {
        let cfg = load_str(
            "[editing]\ninsert_mode = false\n\
             [input]\nprocessed = false\necho = false\n\
             [history]\ncapacity = 5\nno_duplicates = true\n\
             [popup]\nattributes = 0x1F\nmax_height = 8\n\
             [log]\nfilter = \"editor.read=trace\"\n",
        );
        assert!(!cfg.file.editing.insert_mode);
        assert!(!cfg.file.input.processed);
        assert!(!cfg.file.input.echo);
        assert_eq!(cfg.file.history.capacity, 5);
        assert!(cfg.file.history.no_duplicates);
        assert_eq!(cfg.file.popup.attributes, 0x1F);
        assert_eq!(cfg.file.popup.max_height, 8);
        assert_eq!(cfg.file.log.filter, "editor.read=trace");
        assert!(cfg.raw.is_some());
    }

    #[test]
    fn partial_sections_keep_field_defaults() {
        let cfg = load_str("[input]\necho = false\n[history]\nno_duplicates = true\n");
        assert!(cfg.file.input.processed);
        assert!(!cfg.file.input.echo);
        assert_eq!(cfg.file.history.capacity, 50);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let cfg = load_str("[editing]\ninsert_mode = false\nblink = true\n[theme]\nname = \"x\"\n");
        assert!(!cfg.file.editing.insert_mode);
    }

    #[test]
    fn degenerate_sizes_are_raised() {
        let cfg = load_str("[history]\ncapacity = 0\n[popup]\nmax_height = 0\n");
        assert_eq!(cfg.history_capacity(), 1);
        assert_eq!(cfg.popup_max_height(), 1);
    }

    #[test]
    fn parse_error_falls_back_with_warning() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[history]\ncapacity = \"lots\"\n").unwrap();
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::WARN)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        let cfg = with_default(subscriber, || load_from(Some(tmp.path().to_path_buf())).unwrap());

        assert_eq!(cfg.file, ConfigFile::default());
        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("WARN config:"));
        assert!(log_output.contains("config parse failed"));
    }

    #[test]
    fn parse_reports_type_errors() {
        assert!(parse("[popup]\nattributes = true\n").is_err());
        assert!(parse("").is_ok());
    }
}
