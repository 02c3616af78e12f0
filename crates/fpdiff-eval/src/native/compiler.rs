//! C compiler selection.

use std::fmt;
use std::process::{Command, Stdio};
use std::str::FromStr;

/// C compiler used to build native kernels.
///
/// Accepts any compiler command (e.g., "cc", "clang-20", "gcc-13").
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Compiler {
    command: String,
}

impl Compiler {
    /// Create a compiler with the given command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// System default `cc`.
    #[must_use]
    pub fn cc() -> Self {
        Self::new("cc")
    }

    /// Default clang compiler.
    #[must_use]
    pub fn clang() -> Self {
        Self::new("clang")
    }

    /// Default gcc compiler.
    #[must_use]
    pub fn gcc() -> Self {
        Self::new("gcc")
    }

    /// Command to invoke.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Check if this is a clang-based compiler (for flag selection).
    #[must_use]
    pub fn is_clang(&self) -> bool {
        self.command.contains("clang")
    }

    /// Whether the command can be spawned and answers `--version`.
    #[must_use]
    pub fn is_available(&self) -> bool {
        Command::new(&self.command)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|s| s.success())
    }

    /// First available compiler among `cc`, `clang` and `gcc`.
    #[must_use]
    pub fn find() -> Option<Self> {
        [Self::cc(), Self::clang(), Self::gcc()]
            .into_iter()
            .find(Self::is_available)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::cc()
    }
}

impl FromStr for Compiler {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("compiler command cannot be empty".to_string());
        }
        Ok(Self::new(s))
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clang_detection() {
        assert!(Compiler::clang().is_clang());
        assert!(Compiler::new("/opt/llvm/bin/clang-18").is_clang());
        assert!(!Compiler::gcc().is_clang());
        assert!(!Compiler::cc().is_clang());
    }

    #[test]
    fn test_parse() {
        assert_eq!("gcc-13".parse::<Compiler>().unwrap().command(), "gcc-13");
        assert!("".parse::<Compiler>().is_err());
    }

    #[test]
    fn test_missing_compiler_unavailable() {
        assert!(!Compiler::new("fpdiff-no-such-compiler").is_available());
    }
}
