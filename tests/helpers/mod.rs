use std::fs::File;
use std::sync::Mutex;

use anyhow::Result;
use chrootctl::command::Command;
use chrootctl::executor::{CommandExecutor, ProcResult};

/// Which executor entry point a command went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum CallKind {
    Captured,
    Interactive,
    ToFile,
}

/// One recorded executor invocation.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedCall {
    pub kind: CallKind,
    pub argv: Vec<String>,
    pub stdin: Option<Vec<u8>>,
}

/// Executor that records every invocation and returns scripted results
/// instead of spawning processes.
///
/// Failures can be scripted by call index or by argv token; everything else
/// succeeds with exit status 0.
pub struct ScriptedExecutor {
    calls: Mutex<Vec<RecordedCall>>,
    fail_on_calls: Vec<usize>,
    fail_matching: Vec<String>,
}

#[allow(dead_code)]
impl ScriptedExecutor {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on_calls: Vec::new(),
            fail_matching: Vec::new(),
        }
    }

    /// Fails the calls with the given zero-based indexes.
    pub fn failing_on_calls(indexes: Vec<usize>) -> Self {
        Self {
            fail_on_calls: indexes,
            ..Self::new()
        }
    }

    /// Fails every call whose argv contains one of the given tokens.
    pub fn failing_matching<S: Into<String>>(tokens: Vec<S>) -> Self {
        Self {
            fail_matching: tokens.into_iter().map(Into::into).collect(),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn argvs(&self) -> Vec<Vec<String>> {
        self.calls().into_iter().map(|call| call.argv).collect()
    }

    /// Argvs of the calls that went through the given entry point.
    pub fn argvs_of_kind(&self, kind: CallKind) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|call| call.kind == kind)
            .map(|call| call.argv)
            .collect()
    }

    /// Number of recorded calls whose program is `umount`.
    pub fn umount_count(&self) -> usize {
        self.argvs().iter().filter(|argv| argv[0] == "umount").count()
    }

    fn record(&self, kind: CallKind, command: &Command) -> Result<ProcResult> {
        let mut calls = self.calls.lock().unwrap();
        let index = calls.len();
        calls.push(RecordedCall {
            kind,
            argv: command.argv().to_vec(),
            stdin: command.stdin().map(<[u8]>::to_vec),
        });
        drop(calls);

        let scripted_failure = self.fail_on_calls.contains(&index)
            || command
                .argv()
                .iter()
                .any(|token| self.fail_matching.iter().any(|needle| needle == token));

        let raw = if scripted_failure { 1 << 8 } else { 0 };
        Ok(ProcResult::from_raw_exit(raw, Vec::new(), b"scripted failure\n".to_vec()))
    }
}

impl CommandExecutor for ScriptedExecutor {
    fn execute(&self, command: &Command) -> Result<ProcResult> {
        self.record(CallKind::Captured, command)
    }

    fn execute_interactive(&self, command: &Command) -> Result<ProcResult> {
        self.record(CallKind::Interactive, command)
    }

    fn execute_to_file(&self, command: &Command, _stdout: File) -> Result<ProcResult> {
        self.record(CallKind::ToFile, command)
    }
}
