//! Shared helpers for CLI specs

#![allow(dead_code)]

use assert_cmd::Command;
use lumity_core::schema::{definition_ids, field_ids};
use lumity_core::{DataType, FlushPolicy, LogWriter, Priority, Schema, TransactionBuilder};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub use predicates::prelude::*;

pub const PERSON: u64 = 9;
pub const AGE: u64 = 23;
pub const NICKNAME: u64 = 24;

/// Scratch directory holding log files
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn file(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn lumity(&self) -> Run {
        let mut cmd = Command::cargo_bin("lumity").unwrap();
        cmd.current_dir(self.path()).env_remove("RUST_LOG");
        Run { cmd }
    }

    /// Write a log with the Person schema and `people` instances, closing a
    /// signed block after every `block` people
    pub fn people_log(&self, name: &str, people: u64, block: u64) -> PathBuf {
        let path = self.join(name);
        std::fs::write(&path, people_log(people, block)).unwrap();
        path
    }
}

/// Bytes of a log that defines Person, Age and Nickname, then holds people
pub fn people_log(people: u64, block: u64) -> Vec<u8> {
    let schema = Arc::new(Schema::with_defaults().unwrap());
    let mut writer = LogWriter::new(Arc::clone(&schema), Vec::new(), FlushPolicy::immediate(), 0);
    let defines = [
        TransactionBuilder::new(definition_ids::TYPE)
            .uint(field_ids::TIMESTAMP, 1)
            .string(field_ids::NAME, "Person"),
        TransactionBuilder::new(definition_ids::FIELD)
            .uint(field_ids::TIMESTAMP, 1)
            .string(field_ids::NAME, "Age")
            .uint(field_ids::DATA_TYPE, DataType::UInt.code()),
        TransactionBuilder::new(definition_ids::FIELD)
            .uint(field_ids::TIMESTAMP, 1)
            .string(field_ids::NAME, "Nickname")
            .uint(field_ids::DATA_TYPE, DataType::String.code()),
    ];
    for tx in &defines {
        writer.append(tx, Priority::Normal).unwrap();
        // the writer only checks; a forward read registers
        lumity_core::reader::collect_transactions(
            Arc::clone(&schema),
            &tx.encode(),
            lumity_core::Direction::Forward,
        )
        .unwrap();
    }

    for i in 0..people {
        let tx = TransactionBuilder::new(PERSON)
            .uint(field_ids::TIMESTAMP, 1000 + i)
            .uint(AGE, 20 + i)
            .string(NICKNAME, format!("p{}", i));
        writer.append(&tx, Priority::Normal).unwrap();
        if block > 0 && (i + 1) % block == 0 {
            writer.write_block_boundary(1000 + i).unwrap();
        }
    }
    writer.into_inner().unwrap()
}

/// Replace the first occurrence of `pattern` in `bytes`
pub fn patch(bytes: &mut [u8], pattern: &[u8], replacement: &[u8]) {
    let at = bytes
        .windows(pattern.len())
        .position(|w| w == pattern)
        .unwrap();
    bytes[at..at + replacement.len()].copy_from_slice(replacement);
}

/// A command under test
pub struct Run {
    cmd: Command,
}

impl Run {
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    /// Run and require exit code 0
    pub fn passes(mut self) -> Outcome {
        let output = self.cmd.output().unwrap();
        let outcome = Outcome::from(output);
        assert!(
            outcome.success,
            "expected success\nstdout:\n{}\nstderr:\n{}",
            outcome.stdout, outcome.stderr
        );
        outcome
    }

    /// Run and require a non-zero exit code
    pub fn fails(mut self) -> Outcome {
        let output = self.cmd.output().unwrap();
        let outcome = Outcome::from(output);
        assert!(
            !outcome.success,
            "expected failure\nstdout:\n{}\nstderr:\n{}",
            outcome.stdout, outcome.stderr
        );
        outcome
    }
}

/// Captured result of a finished command
pub struct Outcome {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl From<std::process::Output> for Outcome {
    fn from(output: std::process::Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl Outcome {
    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout, expected);
        self
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(
            predicate::str::contains(needle).eval(&self.stdout),
            "stdout does not contain {:?}:\n{}",
            needle,
            self.stdout
        );
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(
            predicate::str::contains(needle).eval(&self.stderr),
            "stderr does not contain {:?}:\n{}",
            needle,
            self.stderr
        );
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(
            !self.stdout.contains(needle),
            "stdout unexpectedly contains {:?}:\n{}",
            needle,
            self.stdout
        );
        self
    }

    pub fn stdout_lines(&self) -> Vec<&str> {
        self.stdout.lines().collect()
    }

    /// Header lines of `dump` text output, one per transaction
    pub fn headers(&self) -> Vec<&str> {
        self.stdout.lines().filter(|l| l.starts_with('#')).collect()
    }

    /// Each stdout line parsed as a JSON document
    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.stdout
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }
}
