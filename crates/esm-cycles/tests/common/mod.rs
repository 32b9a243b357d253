//! Shared fixtures for the integration tests.
//!
//! Every test writes a small project into a temporary directory and analyzes
//! it from disk with the native file system.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use esm_cycles::{HostOptions, Issue, ModuleHost};
use tempfile::TempDir;

pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new(files: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().unwrap();
        for (name, contents) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, contents).unwrap();
        }
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn host(&self, extensions: &[&str]) -> ModuleHost {
        ModuleHost::new(HostOptions {
            extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
            working_directory: self.root().to_path_buf(),
        })
    }

    /// Analyze `entry` with `.js` resolution and return the host.
    pub fn analyze(&self, entry: &str) -> ModuleHost {
        self.analyze_with(entry, &[".js"])
    }

    pub fn analyze_with(&self, entry: &str, extensions: &[&str]) -> ModuleHost {
        let mut host = self.host(extensions);
        host.parse_entrypoint(&self.path(entry)).unwrap();
        host
    }

    pub fn file_names(&self, host: &ModuleHost) -> Vec<String> {
        host.file_names()
            .iter()
            .map(|path| {
                path.strip_prefix(self.root())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }
}

/// The parts of an issue a test usually cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reported {
    pub rule: String,
    pub module: String,
    pub node_type: String,
    pub start: (u32, u32),
    pub end: (u32, u32),
    pub message: String,
}

pub fn reported(
    rule: &str,
    module: &str,
    node_type: &str,
    start: (u32, u32),
    end: (u32, u32),
    message: &str,
) -> Reported {
    Reported {
        rule: rule.to_string(),
        module: module.to_string(),
        node_type: node_type.to_string(),
        start,
        end,
        message: message.to_string(),
    }
}

pub fn summarize(issues: &[Issue]) -> Vec<Reported> {
    issues
        .iter()
        .map(|issue| {
            let lint = issue.to_lint_message();
            Reported {
                rule: lint.rule_id,
                module: issue.relative_path.clone(),
                node_type: lint.node_type,
                start: (lint.line, lint.column),
                end: (lint.end_line.unwrap_or(0), lint.end_column.unwrap_or(0)),
                message: lint.message,
            }
        })
        .collect()
}
