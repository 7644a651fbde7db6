//! Create a fresh knexfile
//!
//! Copies the per-extension template shipped with the local knex module to
//! `./knexfile.<ext>` in the working directory. Never overwrites.

use crate::cli::common::{CommandContext, parse_extension};
use crate::error::CliError;
use crate::output::{Message, Tone};
use crate::types::Extension;
use std::io;
use std::path::Path;
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Run the init command
///
/// Checks run in this order, and nothing is written unless all pass:
/// 1. the extension is one of `js|coffee|ts|eg|ls` (default `js`)
/// 2. no knexfile was resolved for this invocation
/// 3. a local knex module is installed
/// 4. the module's template for the extension can be read
///
/// # Errors
///
/// `InvalidInput`, `AlreadyExists`, `MissingDependency` or `Io`, matching the
/// checks above. A file appearing at the target between resolution and the
/// write is also `AlreadyExists`.
pub async fn run_init(
    ctx: &CommandContext<'_>,
    extension: Option<&str>,
) -> Result<Message, CliError> {
    let ext = match extension {
        Some(tag) => parse_extension(tag)?,
        None => Extension::default(),
    };

    if let Some(existing) = &ctx.env.config_path {
        return Err(CliError::AlreadyExists(existing.clone()));
    }

    let module = ctx.env.require_module()?;
    let stub = module.stub_path(ext);
    tracing::debug!(stub = %stub.display(), "reading knexfile template");
    let content = fs::read(&stub)
        .await
        .map_err(|e| CliError::io(&stub, e))?;

    let file_name = format!("knexfile.{}", ext);
    let target = ctx.env.cwd.join(&file_name);
    let file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(CliError::AlreadyExists(target));
        }
        Err(e) => return Err(CliError::io(&target, e)),
    };
    write_or_remove(file, &target, &content).await?;

    Ok(Message::toned(
        Tone::Success,
        format!("Created ./{}", file_name),
    ))
}

/// Write the template into the freshly created target
///
/// A failed write removes the target so no truncated knexfile is left behind.
async fn write_or_remove<W>(mut file: W, target: &Path, content: &[u8]) -> Result<(), CliError>
where
    W: AsyncWrite + Unpin,
{
    let written = match file.write_all(content).await {
        Ok(()) => file.flush().await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        drop(file);
        if let Err(remove_err) = fs::remove_file(target).await {
            tracing::warn!(
                path = %target.display(),
                error = %remove_err,
                "failed to remove partial knexfile"
            );
        }
        return Err(CliError::io(target, e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, GlobalOptions, LocalModule, ModuleManifest};
    use crate::engine::EngineProvider;
    use crate::error::ErrorKind;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tempfile::TempDir;

    /// Writer that accepts part of the input and then fails
    struct FullDisk {
        accepted: usize,
    }

    impl AsyncWrite for FullDisk {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            if self.accepted > 0 {
                return Poll::Ready(Err(io::Error::other("No space left on device")));
            }
            let n = buf.len().min(4);
            self.accepted += n;
            Poll::Ready(Ok(n))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    fn module_with_stubs(dir: &Path) -> LocalModule {
        let root = dir.join("node_modules").join("knex");
        let stub_dir = root.join("lib").join("migrate").join("stub");
        std::fs::create_dir_all(&stub_dir).unwrap();
        for ext in Extension::ALL {
            std::fs::write(
                stub_dir.join(format!("knexfile-{}.stub", ext)),
                format!("// {} knexfile\n", ext),
            )
            .unwrap();
        }
        LocalModule {
            root,
            manifest: ModuleManifest::parse(r#"{"name": "knex", "version": "0.12.6"}"#).unwrap(),
        }
    }

    fn env(dir: &Path, module: Option<LocalModule>) -> Environment {
        Environment {
            cwd: dir.to_path_buf(),
            config_path: None,
            module,
        }
    }

    async fn init(env: &Environment, extension: Option<&str>) -> Result<Message, CliError> {
        let options = GlobalOptions::default();
        let provider = EngineProvider::standalone();
        let ctx = CommandContext::new(env, &options, &provider);
        run_init(&ctx, extension).await
    }

    #[tokio::test]
    async fn test_init_defaults_to_js() {
        let temp_dir = TempDir::new().unwrap();
        let env = env(temp_dir.path(), Some(module_with_stubs(temp_dir.path())));

        let message = init(&env, None).await.unwrap();

        assert_eq!(message.text(), "Created ./knexfile.js");
        assert_eq!(message.segments()[0].tone, Tone::Success);
        let content = std::fs::read_to_string(temp_dir.path().join("knexfile.js")).unwrap();
        assert_eq!(content, "// js knexfile\n");
    }

    #[tokio::test]
    async fn test_init_every_extension() {
        for ext in Extension::ALL {
            let temp_dir = TempDir::new().unwrap();
            let env = env(temp_dir.path(), Some(module_with_stubs(temp_dir.path())));

            let message = init(&env, Some(ext.as_str())).await.unwrap();

            assert_eq!(message.text(), format!("Created ./knexfile.{}", ext));
            assert!(temp_dir.path().join(format!("knexfile.{}", ext)).is_file());
        }
    }

    #[tokio::test]
    async fn test_init_invalid_extension_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let env = env(temp_dir.path(), Some(module_with_stubs(temp_dir.path())));

        let err = init(&env, Some("py")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(!temp_dir.path().join("knexfile.py").exists());
        assert!(!temp_dir.path().join("knexfile.js").exists());
    }

    #[tokio::test]
    async fn test_init_refuses_resolved_config() {
        let temp_dir = TempDir::new().unwrap();
        let existing = temp_dir.path().join("knexfile.coffee");
        std::fs::write(&existing, "module.exports = {}").unwrap();
        let mut env = env(temp_dir.path(), Some(module_with_stubs(temp_dir.path())));
        env.config_path = Some(existing.clone());

        let err = init(&env, Some("js")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(
            err.to_string(),
            format!("Error: {} already exists", existing.display())
        );
        assert!(!temp_dir.path().join("knexfile.js").exists());
    }

    #[tokio::test]
    async fn test_init_never_overwrites_target() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("knexfile.ts");
        std::fs::write(&target, "keep me").unwrap();
        let env = env(temp_dir.path(), Some(module_with_stubs(temp_dir.path())));

        let err = init(&env, Some("ts")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "keep me");
    }

    #[tokio::test]
    async fn test_init_requires_module() {
        let temp_dir = TempDir::new().unwrap();
        let env = env(temp_dir.path(), None);

        let err = init(&env, None).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MissingDependency);
        assert!(err.to_string().ends_with("Try running: npm install knex."));
        assert!(!temp_dir.path().join("knexfile.js").exists());
    }

    #[tokio::test]
    async fn test_init_missing_template_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let module = module_with_stubs(temp_dir.path());
        std::fs::remove_file(module.stub_path(Extension::Ls)).unwrap();
        let env = env(temp_dir.path(), Some(module));

        let err = init(&env, Some("ls")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(!temp_dir.path().join("knexfile.ls").exists());
    }

    #[tokio::test]
    async fn test_failed_write_removes_partial_knexfile() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("knexfile.js");
        std::fs::write(&target, "// kn").unwrap();

        let err = write_or_remove(FullDisk { accepted: 0 }, &target, b"// js knexfile\n")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("No space left on device"));
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_successful_write_keeps_knexfile() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("knexfile.js");
        let file = tokio::fs::File::create(&target).await.unwrap();

        write_or_remove(file, &target, b"// js knexfile\n").await.unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "// js knexfile\n");
    }
}
