#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::path::PathBuf;
use tempfile::TempDir;

/// An isolated home: config, database, JSON sheets and debug log all live
/// under one temporary directory that is removed on drop.
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn data_dir(&self) -> String {
        self.path("data").to_string_lossy().to_string()
    }

    pub fn db(&self) -> String {
        self.path("data/chronophore.sqlite")
            .to_string_lossy()
            .to_string()
    }

    /// `chronophore --data <tmp>/data --db <tmp>/data/chronophore.sqlite`
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("chronophore");
        cmd.env("HOME", self.dir.path())
            .env("APPDATA", self.dir.path())
            .env_remove("RUST_LOG")
            .args(["--data", &self.data_dir(), "--db", &self.db()]);
        cmd
    }

    /// Same as [`cmd`](Self::cmd), on the fixture-seeded test store.
    pub fn testdb(&self) -> Command {
        let mut cmd = self.cmd();
        cmd.arg("--testdb");
        cmd
    }

    pub fn testdb_json(&self) -> Command {
        let mut cmd = self.testdb();
        cmd.args(["--backend", "json"]);
        cmd
    }
}

pub const PIPPIN: &str = "888333333";
pub const FRODO: &str = "888000000";
