//! Common test utilities for hlasm-flow
//!
//! Lays out driver and dependency sources in a throwaway directory.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Temporary source tree: a driver at the root, dependencies under `lib/`
pub struct SourceTree {
    dir: TempDir,
}

impl SourceTree {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.dir.path().join("lib")
    }

    /// Write a file relative to the root and return its path
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, content).expect("write fixture");
        path
    }

    pub fn driver(&self, content: &str) -> PathBuf {
        self.write("driver.asm", content)
    }

    pub fn lib(&self, name: &str, content: &str) -> PathBuf {
        fs::create_dir_all(self.lib_dir()).expect("create lib dir");
        self.write(&format!("lib/{}", name), content)
    }
}

/// Join fixture lines with newlines (columns matter, so keep them explicit)
pub fn source(lines: &[&str]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// The classic two-parameter error-check macro
pub fn check_macro() -> String {
    source(&[
        "         MACRO",
        "&LBL     CHECK &F,&ERR",
        "&LBL     CLC   &F,=C' '",
        "         GO    &ERR",
        "         MEND",
    ])
}
