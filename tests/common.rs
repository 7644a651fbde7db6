//! Test utilities for knex-cli integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Result type alias for tests
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Extract Ok value or panic with context
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("assertion failed: expected Ok, got Err({:?})", e),
        }
    };
    ($expr:expr, $msg:literal) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Extract Err value or panic with context
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Err(e) => e,
            Ok(v) => panic!("assertion failed: expected Err, got Ok({:?})", v),
        }
    };
}

/// Extensions the CLI recognizes, in search order
pub const EXTENSIONS: [&str; 5] = ["js", "coffee", "ts", "eg", "ls"];

/// Migrator that answers every operation with a fixed success line.
///
/// `latest` applies once per project: the second call reports nothing to do.
/// Arguments of the last call are written to `migrator-args.txt`.
pub const MIGRATOR_OK: &str = r#"#!/bin/sh
echo "$@" > migrator-args.txt
case "$1" in
  make)
    echo "using environment"
    echo "{\"name\": \"20240101120000_$2.$4\"}"
    ;;
  latest)
    if [ -f .applied ]; then
      echo '{"batch": 1, "log": []}'
    else
      touch .applied
      echo '{"batch": 1, "log": ["20240101_users.js", "20240102_posts.js"]}'
    fi
    ;;
  rollback)
    if [ -f .applied ]; then
      rm .applied
      echo '{"batch": 1, "log": ["20240102_posts.js", "20240101_users.js"]}'
    else
      echo '{"batch": 0, "log": []}'
    fi
    ;;
  current-version)
    if [ -f .applied ]; then
      echo '{"version": "20240102"}'
    else
      echo '{"version": "none"}'
    fi
    ;;
  *)
    echo "unknown migrator command: $1" >&2
    exit 2
    ;;
esac
"#;

/// Migrator that fails every operation with a stack trace on stderr
pub const MIGRATOR_FAIL: &str = r#"#!/bin/sh
echo "Using environment: $3"
echo "    at Runner.query (runner.js:12:7)" >&2
echo "error: relation \"users\" already exists" >&2
exit 1
"#;

/// Migrator that fails at once without reading stdin
pub const MIGRATOR_FAIL_EARLY: &str = r#"#!/bin/sh
echo "error: connect ECONNREFUSED 127.0.0.1:5432" >&2
exit 1
"#;

/// Migrator that echoes its stdin back as the version
pub const MIGRATOR_ECHO_STDIN: &str = r#"#!/bin/sh
input=$(cat)
printf '%s' "$input" > stdin.json
echo '{"version": "from-stdin"}'
"#;

/// A throwaway project directory
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn module_root(&self) -> PathBuf {
        self.path().join("node_modules").join("knex")
    }

    /// Install a local knex module with a stub for every extension
    pub fn install_module(&self, version: &str) -> &Self {
        let root = self.module_root();
        let stub_dir = root.join("lib").join("migrate").join("stub");
        fs::create_dir_all(&stub_dir).unwrap();
        fs::write(
            root.join("package.json"),
            format!(r#"{{"name": "knex", "version": "{}"}}"#, version),
        )
        .unwrap();
        for ext in EXTENSIONS {
            fs::write(
                stub_dir.join(format!("knexfile-{}.stub", ext)),
                format!("// knexfile template ({})\n", ext),
            )
            .unwrap();
        }
        self
    }

    /// Install the module's migrator executable
    #[cfg(unix)]
    pub fn install_migrator(&self, script: &str) -> &Self {
        use std::os::unix::fs::PermissionsExt;

        let bin = self.module_root().join("bin");
        fs::create_dir_all(&bin).unwrap();
        let path = bin.join("knex-migrate");
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        self
    }

    pub fn write_knexfile(&self, ext: &str) -> PathBuf {
        let path = self.path().join(format!("knexfile.{}", ext));
        fs::write(&path, "module.exports = { client: 'sqlite3' };\n").unwrap();
        path
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path().join(relative)).unwrap()
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path().join(relative).exists()
    }
}
