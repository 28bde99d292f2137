//! Immutable command values.
//!
//! A [`Command`] is an ordered argv plus optional bytes to feed the process
//! on stdin. Rebinding a command into a chroot produces a new value with the
//! `chroot <root>` wrapper prepended; the original is never mutated.

use camino::Utf8Path;

/// Specification for one external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Full argument vector; the first token names the program.
    argv: Vec<String>,
    /// Bytes written to the process's stdin, if any.
    stdin: Option<Vec<u8>>,
}

impl Command {
    /// Creates a command from its full argv.
    #[must_use]
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv, stdin: None }
    }

    /// Creates a command from string-like tokens.
    #[must_use]
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(tokens.into_iter().map(Into::into).collect())
    }

    /// Sets the bytes to feed on stdin.
    #[must_use]
    pub fn with_stdin(mut self, stdin: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(stdin.into());
        self
    }

    /// Returns a new command that executes inside `root` via the `chroot`
    /// wrapper. Stdin bytes carry over unchanged.
    ///
    /// Rebinding an empty command yields a bare `chroot <root>`, which runs
    /// the root's default shell.
    #[must_use]
    pub fn in_chroot(&self, root: &Utf8Path) -> Self {
        let mut argv = Vec::with_capacity(self.argv.len() + 2);
        argv.push("chroot".to_string());
        argv.push(root.to_string());
        argv.extend(self.argv.iter().cloned());
        Self {
            argv,
            stdin: self.stdin.clone(),
        }
    }

    /// The program name, i.e. the first argv token.
    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    /// Arguments following the program name.
    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }

    /// The full argument vector including the program name.
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Bytes to feed on stdin, if any.
    pub fn stdin(&self) -> Option<&[u8]> {
        self.stdin.as_deref()
    }
}

impl std::fmt::Display for Command {
    /// Space-separated, debug-quoted argv (e.g. `"mount" "-t" "proc"`),
    /// used by error messages and logging.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered = self
            .argv
            .iter()
            .map(|a| format!("{:?}", a))
            .collect::<Vec<_>>()
            .join(" ");
        f.write_str(&rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8Path;

    #[test]
    fn program_and_args_split() {
        let command = Command::from_tokens(["mount", "-t", "proc", "proc", "/srv/box/proc"]);
        assert_eq!(command.program(), Some("mount"));
        assert_eq!(command.args(), ["-t", "proc", "proc", "/srv/box/proc"]);
    }

    #[test]
    fn empty_command_has_no_program() {
        let command = Command::new(Vec::new());
        assert_eq!(command.program(), None);
        assert!(command.args().is_empty());
    }

    #[test]
    fn in_chroot_prepends_wrapper() {
        let command = Command::from_tokens(["service", "nginx", "start"]);
        let rebound = command.in_chroot(Utf8Path::new("/srv/box"));
        assert_eq!(rebound.argv(), ["chroot", "/srv/box", "service", "nginx", "start"]);
        // original untouched
        assert_eq!(command.argv(), ["service", "nginx", "start"]);
    }

    #[test]
    fn in_chroot_of_empty_command_is_bare_shell() {
        let rebound = Command::new(Vec::new()).in_chroot(Utf8Path::new("/srv/box"));
        assert_eq!(rebound.argv(), ["chroot", "/srv/box"]);
    }

    #[test]
    fn in_chroot_preserves_stdin() {
        let command = Command::from_tokens(["dd", "of=/usr/sbin/policy-rc.d"])
            .with_stdin(b"#!/bin/sh\nexit 101\n".to_vec());
        let rebound = command.in_chroot(Utf8Path::new("/srv/box"));
        assert_eq!(rebound.stdin(), Some(b"#!/bin/sh\nexit 101\n".as_slice()));
    }

    #[test]
    fn display_is_debug_quoted() {
        let command = Command::from_tokens(["rm", "-f", "/etc/mtab"]);
        assert_eq!(command.to_string(), r#""rm" "-f" "/etc/mtab""#);
    }
}
