//! Harness configuration
//!
//! Built once from the command line and passed by reference into the
//! walker, runner and reporter. There is no configuration file.

use std::ffi::OsStr;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;

use super::{Error, Result};

/// Seconds a test case may run before it is killed
pub const DEFAULT_TIMEOUT_SECS: u64 = 2;

/// Extension (without the dot) that marks a file as a test script
pub const DEFAULT_EXTENSION: &str = "lua";

/// How the reporter renders results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable tagged lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// When to emit ANSI color codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Color when stdout is an ANSI-capable terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Decide once whether the reporter should write escape codes
    pub fn resolve(self) -> bool {
        match self {
            ColorChoice::Always => ansi_supported(),
            ColorChoice::Never => false,
            ColorChoice::Auto => std::io::stdout().is_terminal() && ansi_supported(),
        }
    }
}

/// Legacy Windows consoles cannot render ANSI sequences unless virtual
/// terminal processing can be switched on.
#[cfg(windows)]
fn ansi_supported() -> bool {
    colored::control::set_virtual_terminal(true).is_ok()
}

#[cfg(not(windows))]
fn ansi_supported() -> bool {
    true
}

/// Complete configuration for one harness run
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Directory scanned recursively for test scripts
    pub root: PathBuf,
    /// Interpreter invoked as `<interpreter> <script>`
    pub interpreter: PathBuf,
    /// Wall-clock deadline per test case
    pub timeout: Duration,
    /// Script extension, without a leading dot
    pub extension: String,
    /// Whether the reporter writes ANSI color codes
    pub color: bool,
    /// Reporter output format
    pub format: OutputFormat,
}

impl HarnessConfig {
    /// Create a configuration with the default timeout and extension
    pub fn new(root: impl Into<PathBuf>, interpreter: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            interpreter: interpreter.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            extension: DEFAULT_EXTENSION.to_string(),
            color: false,
            format: OutputFormat::Text,
        }
    }

    /// Set the per-case deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the script extension; a leading dot is accepted and dropped
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.strip_prefix('.').unwrap_or(extension).to_string();
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Check settings that clap cannot validate on its own
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(Error::Config("timeout must be greater than zero".to_string()));
        }
        if self.extension.is_empty() {
            return Err(Error::Config("script extension must not be empty".to_string()));
        }
        Ok(())
    }

    /// Whether `path` names a test script (case-sensitive extension match)
    pub fn is_script(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext == OsStr::new(&self.extension))
            .unwrap_or(false)
    }
}

/// Resolve a bare interpreter name through `PATH`
///
/// Paths with a directory component are returned unchanged. If lookup fails
/// the name is kept so every case reports the launch failure itself.
pub fn resolve_interpreter(interpreter: &Path) -> PathBuf {
    if interpreter.components().count() > 1 {
        return interpreter.to_path_buf();
    }
    match which::which(interpreter) {
        Ok(resolved) => {
            tracing::debug!(interpreter = %resolved.display(), "Resolved interpreter on PATH");
            resolved
        }
        Err(e) => {
            tracing::debug!(
                interpreter = %interpreter.display(),
                error = %e,
                "Interpreter not found on PATH"
            );
            interpreter.to_path_buf()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::new("suites", "luaj");
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(config.extension, "lua");
        assert_eq!(config.format, OutputFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_extension_leading_dot_is_dropped() {
        let config = HarnessConfig::new("suites", "luaj").with_extension(".test");
        assert_eq!(config.extension, "test");
    }

    #[test]
    fn test_is_script_is_case_sensitive() {
        let config = HarnessConfig::new("suites", "luaj");
        assert!(config.is_script(Path::new("suite/ok_case.lua")));
        assert!(!config.is_script(Path::new("suite/ok_case.LUA")));
        assert!(!config.is_script(Path::new("suite/notes.txt")));
        assert!(!config.is_script(Path::new("suite/lua")));
    }

    #[test]
    fn test_validate_rejects_zero_timeout_and_empty_extension() {
        let config = HarnessConfig::new("suites", "luaj").with_timeout(Duration::ZERO);
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = HarnessConfig::new("suites", "luaj").with_extension(".");
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_never_disables_color() {
        assert!(!ColorChoice::Never.resolve());
    }

    #[test]
    fn test_resolve_keeps_paths_with_directories() {
        let path = Path::new("./build/luaj");
        assert_eq!(resolve_interpreter(path), path);
    }
}
