//! Writing the managed `resolv.conf`.
//!
//! Validation and rendering never touch the filesystem; the result is handed
//! to a [`FileSink`], which makes the file on disk hold exactly that content.

use crate::config::ResolvConf;
use crate::error::Result;
use crate::params::ResolverParams;
use crate::render::Renderer;
use crate::validate::validate;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// What happened (or would happen) to the target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file already held the desired content.
    Unchanged,
    /// The file did not exist.
    Created,
    /// The file existed with different content.
    Updated,
}

impl WriteOutcome {
    /// Returns `true` unless the file was already in the desired state.
    #[must_use]
    pub const fn would_change(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Destination for rendered content.
pub trait FileSink: Send + Sync {
    /// Reports what [`ensure`](Self::ensure) would do, without writing.
    ///
    /// # Errors
    ///
    /// Returns an error if the current state cannot be inspected.
    fn check(&self, path: &Path, content: &str) -> Result<WriteOutcome>;

    /// Makes the file at `path` contain exactly `content`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn ensure(&self, path: &Path, content: &str) -> Result<WriteOutcome>;
}

/// Writes through a temporary file in the target's directory and renames it
/// into place, so readers never observe a half-written file.
///
/// Writing identical content is a no-op. The mode of an existing file is
/// carried over to its replacement; new files get `0644`. Each call uses its
/// own temporary file, so concurrent writers to one path never collide.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtomicFileSink;

impl FileSink for AtomicFileSink {
    fn check(&self, path: &Path, content: &str) -> Result<WriteOutcome> {
        Ok(compare(path, content)?)
    }

    fn ensure(&self, path: &Path, content: &str) -> Result<WriteOutcome> {
        let outcome = compare(path, content)?;
        if !outcome.would_change() {
            return Ok(outcome);
        }

        write_replacement(path, content)?;
        Ok(outcome)
    }
}

fn compare(path: &Path, content: &str) -> io::Result<WriteOutcome> {
    match fs::read(path) {
        Ok(current) if current == content.as_bytes() => Ok(WriteOutcome::Unchanged),
        Ok(_) => Ok(WriteOutcome::Updated),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(WriteOutcome::Created),
        Err(e) => Err(e),
    }
}

/// Writes `/etc/.resolv.conf.<random>.tmp` and renames it over the target.
/// The temporary file is removed if any step fails.
fn write_replacement(path: &Path, content: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .map_or_else(|| "resolv.conf".into(), |n| n.to_string_lossy());

    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(".{name}."))
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;

    match fs::metadata(path) {
        Ok(meta) => tmp.as_file().set_permissions(meta.permissions())?,
        Err(_) => set_default_mode(tmp.as_file())?,
    }
    tmp.persist(path)?;
    Ok(())
}

/// Temporary files start out `0600`; a new `resolv.conf` must be world-readable.
#[cfg(unix)]
fn set_default_mode(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_default_mode(_file: &fs::File) -> io::Result<()> {
    Ok(())
}

/// Validates parameters, renders them and hands the result to a sink.
///
/// # Example
///
/// ```rust,ignore
/// use resolvconf_manager::{ResolvConfManager, ResolverParams};
///
/// let manager = ResolvConfManager::new("myapp");
/// let params = ResolverParams::new()
///     .with_nameservers(["127.0.0.1"])
///     .with_search(["example.com"]);
/// manager.apply(&params)?; // requires root for /etc/resolv.conf
/// ```
pub struct ResolvConfManager {
    renderer: Renderer,
    sink: Box<dyn FileSink>,
    noop: bool,
}

impl ResolvConfManager {
    /// Creates a manager that stamps files as managed by `tool` and writes
    /// them with [`AtomicFileSink`].
    #[must_use]
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            renderer: Renderer::new(tool),
            sink: Box::new(AtomicFileSink),
            noop: false,
        }
    }

    /// Replaces the file sink.
    #[must_use]
    pub fn sink(mut self, sink: impl FileSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// In noop mode [`apply`](Self::apply) reports the outcome without writing.
    #[must_use]
    pub const fn noop(mut self, noop: bool) -> Self {
        self.noop = noop;
        self
    }

    /// Returns the renderer.
    #[must_use]
    pub const fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Validates and renders `params` without writing anything.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::Validation`](crate::ResolverError::Validation)
    /// with every failed check.
    pub fn plan(&self, params: &ResolverParams) -> Result<(ResolvConf, String)> {
        let conf = validate(params)?;
        let content = self.renderer.content(&conf);
        Ok((conf, content))
    }

    /// Validates, renders and writes `params`.
    ///
    /// Nothing is written when validation fails.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::Validation`](crate::ResolverError::Validation)
    /// on invalid parameters, or [`ResolverError::Io`](crate::ResolverError::Io)
    /// if the sink fails.
    pub fn apply(&self, params: &ResolverParams) -> Result<WriteOutcome> {
        let (conf, content) = self.plan(params)?;
        let path = conf.path();

        if self.noop {
            let outcome = self.sink.check(path, &content)?;
            tracing::debug!(path = %path.display(), ?outcome, "Noop: resolv.conf not written");
            return Ok(outcome);
        }

        let outcome = self.sink.ensure(path, &content)?;
        if outcome.would_change() {
            tracing::info!(
                path = %path.display(),
                ?outcome,
                bytes = content.len(),
                "Wrote resolv.conf"
            );
        } else {
            tracing::debug!(path = %path.display(), "resolv.conf already up to date");
        }
        Ok(outcome)
    }

    /// Returns `true` if the file at `path` starts with this tool's banner.
    #[must_use]
    pub fn is_managed(&self, path: &Path) -> bool {
        let banner = self.renderer.banner();
        fs::read_to_string(path).is_ok_and(|c| c.lines().next() == Some(banner.as_str()))
    }
}

impl std::fmt::Debug for ResolvConfManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvConfManager")
            .field("renderer", &self.renderer)
            .field("noop", &self.noop)
            .finish_non_exhaustive()
    }
}
