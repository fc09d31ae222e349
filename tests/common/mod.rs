//! Shared fixture for integration tests: a temp directory tree plus a
//! helper that runs a rule file against it.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use organize_cli::config::Config;
use organize_cli::fsops::SystemFileOps;
use organize_cli::report::RunReport;
use organize_cli::run::{Runner, TagSelection};

pub struct Sandbox {
    dir: tempfile::TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create sandbox"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn mkdir(&self, rel: &str) -> PathBuf {
        let p = self.path(rel);
        fs::create_dir_all(&p).expect("mkdir");
        p
    }

    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let p = self.path(rel);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).expect("mkdir parent");
        }
        fs::write(&p, content).expect("write file");
        p
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).expect("read file")
    }

    /// Parse `rules` (with `$ROOT` replaced by the sandbox path) and run
    /// it against the real filesystem.
    pub fn run(&self, rules: &str, simulate: bool) -> RunReport {
        self.run_selected(rules, simulate, &TagSelection::default())
    }

    pub fn run_selected(
        &self,
        rules: &str,
        simulate: bool,
        selection: &TagSelection,
    ) -> RunReport {
        let rendered = rules.replace("$ROOT", &self.dir.path().display().to_string());
        let config = Config::parse(&rendered, "test-rules.toml").expect("parse rules");
        let fs = SystemFileOps;
        Runner::new(&fs, simulate).run(&config, selection)
    }
}
