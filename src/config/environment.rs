//! Environment resolution
//!
//! Locates the working directory, the nearest knexfile and the locally
//! installed knex module before any command runs. The result is an
//! [`Environment`] descriptor that every command reads but never mutates.
//!
//! Search strategy:
//! - An explicit `--knexfile` is used as given (relative to the working
//!   directory) and must exist.
//! - Otherwise each directory from the working directory up to the root is
//!   checked for `knexfile.<ext>`, trying extensions in [`Extension::ALL`]
//!   order. The first hit wins.
//! - Unless `--cwd` was given, the working directory then becomes the
//!   knexfile's directory, however the knexfile was found.
//! - The module is looked up as `node_modules/knex/package.json`, starting at
//!   the knexfile's directory (or the working directory) and walking upward.

use crate::config::manifest::ModuleManifest;
use crate::config::options::GlobalOptions;
use crate::error::{CliError, EnvError};
use crate::types::Extension;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A locally installed knex module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalModule {
    /// Directory containing the module's `package.json`
    pub root: PathBuf,
    pub manifest: ModuleManifest,
}

impl LocalModule {
    pub fn version(&self) -> &str {
        &self.manifest.version
    }

    /// Path of the knexfile template shipped with the module
    pub fn stub_path(&self, ext: Extension) -> PathBuf {
        self.root
            .join("lib")
            .join("migrate")
            .join("stub")
            .join(format!("knexfile-{}.stub", ext))
    }

    /// Path of the migrator executable the standalone engine runs
    pub fn migrator_path(&self) -> PathBuf {
        self.manifest.migrator_path(&self.root)
    }
}

/// Resolved facts about the run context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Absolute working directory
    pub cwd: PathBuf,

    /// Knexfile in effect, if any
    pub config_path: Option<PathBuf>,

    /// Local knex install, if any
    pub module: Option<LocalModule>,
}

impl Environment {
    pub fn module_path(&self) -> Option<&Path> {
        self.module.as_ref().map(|m| m.root.as_path())
    }

    pub fn module_version(&self) -> Option<&str> {
        self.module.as_ref().map(|m| m.version())
    }

    /// Extension of the resolved knexfile
    pub fn config_extension(&self) -> Option<Extension> {
        self.config_path.as_deref().and_then(Extension::from_path)
    }

    /// The local module, or `MissingDependency` if none is installed
    pub fn require_module(&self) -> Result<&LocalModule, CliError> {
        self.module.as_ref().ok_or_else(|| CliError::MissingDependency {
            cwd: self.cwd.clone(),
        })
    }
}

/// Locates knexfiles and local module installs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolver {
    /// Module name, also the directory under `modules_dir`
    name: String,
    /// File stem of the project config file
    config_stem: String,
    /// Directory holding installed modules
    modules_dir: String,
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            name: "knex".to_string(),
            config_stem: "knexfile".to_string(),
            modules_dir: "node_modules".to_string(),
        }
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve starting from the process working directory
    pub fn resolve(&self, options: &GlobalOptions) -> Result<Environment, EnvError> {
        let start = std::env::current_dir().map_err(EnvError::CurrentDir)?;
        self.resolve_from(&start, options)
    }

    /// Resolve starting from `start`
    pub fn resolve_from(
        &self,
        start: &Path,
        options: &GlobalOptions,
    ) -> Result<Environment, EnvError> {
        let mut cwd = match &options.cwd {
            Some(dir) => {
                let dir = absolutize(start, dir);
                if !dir.is_dir() {
                    return Err(EnvError::MissingCwd(dir));
                }
                dir
            }
            None => start.to_path_buf(),
        };

        let config_path = match &options.knexfile {
            Some(path) => {
                let path = absolutize(&cwd, path);
                if !path.exists() {
                    return Err(EnvError::ConfigNotFound(path));
                }
                ensure_readable(&path)?;
                if options.cwd.is_none()
                    && let Some(parent) = path.parent()
                {
                    cwd = parent.to_path_buf();
                }
                Some(path)
            }
            None => {
                let found = self.find_config(&cwd)?;
                if options.cwd.is_none()
                    && let Some(parent) = found.as_deref().and_then(Path::parent)
                {
                    cwd = parent.to_path_buf();
                }
                found
            }
        };

        let search_root = config_path
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or(&cwd)
            .to_path_buf();
        let module = self.find_module(&search_root)?;

        match &config_path {
            Some(path) => tracing::debug!(knexfile = %path.display(), "resolved knexfile"),
            None => tracing::debug!(cwd = %cwd.display(), "no knexfile found"),
        }
        match &module {
            Some(m) => tracing::debug!(
                module = %m.root.display(),
                version = %m.version(),
                "found local module"
            ),
            None => tracing::debug!(search_root = %search_root.display(), "no local module found"),
        }

        Ok(Environment {
            cwd,
            config_path,
            module,
        })
    }

    /// Walk upward from `dir` looking for a knexfile
    fn find_config(&self, dir: &Path) -> Result<Option<PathBuf>, EnvError> {
        for ancestor in dir.ancestors() {
            for ext in Extension::ALL {
                let candidate = ancestor.join(format!("{}.{}", self.config_stem, ext));
                if candidate.exists() {
                    ensure_readable(&candidate)?;
                    return Ok(Some(candidate));
                }
            }
        }
        Ok(None)
    }

    /// Walk upward from `dir` looking for an installed module
    fn find_module(&self, dir: &Path) -> Result<Option<LocalModule>, EnvError> {
        for ancestor in dir.ancestors() {
            let root = ancestor.join(&self.modules_dir).join(&self.name);
            let manifest_path = root.join("package.json");
            if manifest_path.is_file() {
                let manifest = ModuleManifest::load(&manifest_path)?;
                return Ok(Some(LocalModule { root, manifest }));
            }
        }
        Ok(None)
    }
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// A knexfile that exists must be a readable regular file
fn ensure_readable(path: &Path) -> Result<(), EnvError> {
    let unreadable = |source| EnvError::ConfigUnreadable {
        path: path.to_path_buf(),
        source,
    };
    let metadata = fs::metadata(path).map_err(unreadable)?;
    if !metadata.is_file() {
        return Err(unreadable(io::Error::other("not a regular file")));
    }
    fs::File::open(path).map_err(unreadable)?;
    Ok(())
}
