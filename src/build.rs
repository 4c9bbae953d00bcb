//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output site: loading the templates
//! ([`crate::page::Templates`]), creating the namespace directories and
//! writing the type pages ([`crate::write`]), and copying the static assets
//! into the output directory.

use crate::config::Config;
use crate::model::Element;
use crate::page::{PageRenderer, Templates};
use crate::template::Error as TemplateError;
use crate::write::{Error as WriteError, Writer};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What a build produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Namespace directories in the output.
    pub directories: usize,

    /// Type pages written.
    pub pages: usize,

    pub assets: AssetStats,
}

/// What [`clone_static_assets`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssetStats {
    pub copied: usize,

    /// Files left alone because the destination already existed.
    pub skipped: usize,
}

/// Builds the site for the symbol tree rooted at `root`. All directories are
/// created before the first page is written, and static assets are copied
/// last so that they never replace a generated page.
pub fn build_site(config: &Config, root: &Element) -> Result<BuildStats> {
    let templates = Templates::load(
        config.template_directory.as_deref(),
        &config.default_template_directory,
    )?;
    let renderer = PageRenderer::new(&templates);
    let writer = Writer {
        renderer: &renderer,
        output_directory: &config.output_directory,
    };

    tracing::info!(output = %config.output_directory.display(), "Building site");
    let directories = writer.create_directories(root)?;
    let pages = writer.render_tree(root)?;
    let assets = clone_static_assets(&config.static_directory, &config.output_directory)?;

    let stats = BuildStats {
        directories,
        pages,
        assets,
    };
    tracing::info!(
        directories = stats.directories,
        pages = stats.pages,
        assets_copied = stats.assets.copied,
        assets_skipped = stats.assets.skipped,
        "Site built"
    );
    Ok(stats)
}

/// Copies the contents of `static_dir` into `output_dir`, recreating its
/// subdirectories. A file whose destination already exists is skipped, so
/// running this twice changes nothing and never touches generated or
/// hand-edited output. Does nothing if `static_dir` doesn't exist.
pub fn clone_static_assets(static_dir: &Path, output_dir: &Path) -> Result<AssetStats> {
    let mut stats = AssetStats::default();
    if !static_dir.is_dir() {
        tracing::debug!(path = %static_dir.display(), "No static directory; skipping");
        return Ok(stats);
    }

    for result in WalkDir::new(static_dir).min_depth(1) {
        let entry = result?;
        let relative = entry
            .path()
            .strip_prefix(static_dir)
            .map_err(|_| Error::Io {
                path: entry.path().to_owned(),
                err: io::Error::new(io::ErrorKind::Other, "not inside the static directory"),
            })?;
        let destination = output_dir.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&destination).map_err(|err| Error::Io {
                path: destination.clone(),
                err,
            })?;
        } else if destination.exists() {
            tracing::debug!(path = %destination.display(), "Asset exists; leaving it alone");
            stats.skipped += 1;
        } else {
            std::fs::copy(entry.path(), &destination).map_err(|err| Error::Io {
                path: destination.clone(),
                err,
            })?;
            tracing::debug!(path = %destination.display(), "Copied asset");
            stats.copied += 1;
        }
    }

    Ok(stats)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can come from loading
/// templates, writing pages, or copying static assets.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading template files.
    Template(TemplateError),

    /// Returned for errors rendering or writing pages.
    Write(WriteError),

    /// Returned for errors walking the static directory.
    WalkDir(walkdir::Error),

    /// Returned for I/O problems while copying static assets.
    Io { path: PathBuf, err: io::Error },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::Io { path, err } => {
                write!(f, "Copying static asset '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Io { path: _, err } => Some(err),
        }
    }
}

impl From<TemplateError> for Error {
    /// Converts [`TemplateError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: TemplateError) -> Error {
        Error::Template(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_clone_static_assets_is_additive() {
        let assets = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        fs::create_dir_all(assets.path().join("css/fonts")).unwrap();
        fs::write(assets.path().join("style.css"), "body {}").unwrap();
        fs::write(assets.path().join("css/print.css"), "@media print {}").unwrap();
        fs::write(assets.path().join("css/fonts/mono.woff"), "font").unwrap();
        fs::write(out.path().join("style.css"), "hand edited").unwrap();

        let first = clone_static_assets(assets.path(), out.path()).unwrap();
        assert_eq!(first, AssetStats { copied: 2, skipped: 1 });
        assert_eq!(fs::read_to_string(out.path().join("style.css")).unwrap(), "hand edited");
        assert_eq!(
            fs::read_to_string(out.path().join("css/print.css")).unwrap(),
            "@media print {}"
        );
        assert!(out.path().join("css/fonts/mono.woff").is_file());

        let second = clone_static_assets(assets.path(), out.path()).unwrap();
        assert_eq!(second, AssetStats { copied: 0, skipped: 3 });
    }

    #[test]
    fn test_clone_static_assets_without_directory() {
        let out = tempfile::tempdir().unwrap();
        let stats = clone_static_assets(&out.path().join("missing"), out.path()).unwrap();
        assert_eq!(stats, AssetStats::default());
    }
}
