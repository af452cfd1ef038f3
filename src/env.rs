use anyhow::{Context, Result, bail};
use std::env as stdenv;
use std::path::{Path, PathBuf};

/// Environment variable holding the colon-delimited executable search path.
pub const PATH_VAR: &str = "MYPATH";

/// Search path used when [`PATH_VAR`] is not set.
pub const DEFAULT_PATH: &str = "/bin:.";

/// Ordered list of directories searched for executables.
///
/// Parsed once at startup and immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    /// Parse a colon-delimited directory list.
    ///
    /// Empty entries (as in `a::b`) are skipped. Fails when no directory
    /// survives, which callers treat as a fatal configuration error.
    pub fn parse(value: &str) -> Result<Self> {
        let dirs: Vec<PathBuf> = value
            .split(':')
            .filter(|entry| !entry.is_empty())
            .map(PathBuf::from)
            .collect();
        if dirs.is_empty() {
            bail!("search path {value:?} contains no directories");
        }
        Ok(Self { dirs })
    }

    /// Directories in search order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.dirs.iter().map(PathBuf::as_path)
    }
}

impl Default for SearchPath {
    fn default() -> Self {
        Self {
            dirs: DEFAULT_PATH.split(':').map(PathBuf::from).collect(),
        }
    }
}

/// Mutable, user-level view of the process environment used by the interpreter.
///
/// Note: fields are public for simplicity to keep the crate small. Production
/// code would prefer accessor methods over public fields.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Where executables are looked up. Fixed after startup.
    pub search_path: SearchPath,
    /// Home directory used by `cd` tilde forms, from `HOME`.
    pub home: Option<PathBuf>,
    /// The current working directory, shown in the prompt and tracked by `cd`.
    pub current_dir: PathBuf,
    /// When set to true, indicates that the interactive loop should exit.
    pub should_exit: bool,
}

impl Environment {
    /// Capture the current process state into a new `Environment`.
    ///
    /// The search path comes from [`PATH_VAR`], falling back to
    /// [`DEFAULT_PATH`] when the variable is absent. A variable that is
    /// present but unusable (not Unicode, or yielding no directories) is the
    /// one fatal startup condition.
    pub fn from_process() -> Result<Self> {
        let search_path = match stdenv::var(PATH_VAR) {
            Ok(value) => SearchPath::parse(&value)
                .with_context(|| format!("can't parse {PATH_VAR}"))?,
            Err(stdenv::VarError::NotPresent) => SearchPath::default(),
            Err(stdenv::VarError::NotUnicode(raw)) => {
                bail!("{PATH_VAR} is not valid unicode: {raw:?}")
            }
        };
        let home = stdenv::var_os("HOME").map(PathBuf::from);
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Ok(Self {
            search_path,
            home,
            current_dir,
            should_exit: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_directories_in_order() {
        let path = SearchPath::parse("/usr/bin:/bin:.").unwrap();
        let dirs: Vec<_> = path.iter().collect();
        assert_eq!(
            dirs,
            vec![Path::new("/usr/bin"), Path::new("/bin"), Path::new(".")]
        );
    }

    #[test]
    fn skips_empty_entries() {
        let path = SearchPath::parse("/bin::.").unwrap();
        assert_eq!(path.iter().count(), 2);
    }

    #[test]
    fn rejects_a_value_with_no_directories() {
        assert!(SearchPath::parse("").is_err());
        assert!(SearchPath::parse(":::").is_err());
    }

    #[test]
    fn default_matches_the_builtin_path() {
        let default = SearchPath::default();
        let dirs: Vec<_> = default.iter().collect();
        assert_eq!(dirs, vec![Path::new("/bin"), Path::new(".")]);
    }
}
