//! Maps the symbol tree onto the output directory: one directory per
//! namespace and one HTML file per documented type. Also builds the sitewide
//! menu that every page embeds.

use crate::model::{Element, ElementBody, ElementKind};
use crate::page::{Error as PageError, PageRenderer};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Responsible for laying out directories and writing pages to disk.
pub struct Writer<'a> {
    /// Renders the contents of each page.
    pub renderer: &'a PageRenderer<'a>,

    /// The root of the generated site. A type `Widget` in namespace
    /// `Acme.Gadgets` is written to
    /// `{output_directory}/Acme/Gadgets/Widget.html`.
    pub output_directory: &'a Path,
}

impl Writer<'_> {
    /// Creates the output directory and one directory per namespace beneath
    /// it, pre-order. Directories that already exist are left as they are.
    /// Returns the number of namespace directories.
    pub fn create_directories(&self, root: &Element) -> Result<usize> {
        create_dir(self.output_directory)?;
        let mut count = 0;
        create_namespace_directories(root, self.output_directory, &mut count)?;
        Ok(count)
    }

    /// Renders and writes every type page. Must run after
    /// [`Writer::create_directories`], since pages are written into existing
    /// directories. Returns the number of pages written.
    pub fn render_tree(&self, root: &Element) -> Result<usize> {
        let mut count = 0;
        self.write_pages(root, root, self.output_directory, &mut count)?;
        Ok(count)
    }

    fn write_pages(
        &self,
        element: &Element,
        root: &Element,
        dir: &Path,
        count: &mut usize,
    ) -> Result<()> {
        match &element.body {
            ElementBody::Container(children) => {
                let dir = namespace_dir(element, dir);
                for child in children {
                    self.write_pages(child, root, &dir, count)?;
                }
            }
            ElementBody::Leaf(_) => {
                let file_path = dir.join(format!("{}.html", element.name));
                let contents = self.renderer.render_page(element, root)?;
                std::fs::write(&file_path, contents).map_err(|err| Error::Io {
                    path: file_path.clone(),
                    err,
                })?;
                tracing::debug!(path = %file_path.display(), "Wrote page");
                *count += 1;
            }
        }
        Ok(())
    }
}

/// The directory a container's children live in. The root contributes no
/// path segment.
fn namespace_dir(element: &Element, parent: &Path) -> PathBuf {
    match element.kind {
        ElementKind::Root => parent.to_owned(),
        _ => parent.join(&element.name),
    }
}

fn create_namespace_directories(element: &Element, dir: &Path, count: &mut usize) -> Result<()> {
    if let ElementBody::Container(children) = &element.body {
        let dir = namespace_dir(element, dir);
        if element.kind != ElementKind::Root {
            create_dir(&dir)?;
            tracing::debug!(path = %dir.display(), "Created namespace directory");
            *count += 1;
        }
        for child in children {
            create_namespace_directories(child, &dir, count)?;
        }
    }
    Ok(())
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|err| Error::Io {
        path: dir.to_owned(),
        err,
    })
}

/// The prefix that climbs `depth` directories: `../` repeated `depth` times.
pub fn relative_prefix(depth: usize) -> String {
    "../".repeat(depth)
}

/// Builds the sitewide menu as nested `<ul>` lists mirroring the tree.
/// Namespaces are labels with a nested list; types are links. `depth` is the
/// depth of the page the menu is embedded in, so every link first climbs
/// back to the output root and then descends to its target.
pub fn build_menu(root: &Element, depth: usize) -> String {
    let prefix = relative_prefix(depth);
    let mut out = String::from("<ul>\n");
    match &root.body {
        ElementBody::Container(children) if root.kind == ElementKind::Root => {
            for child in children {
                write_menu_item(child, &prefix, "    ", &mut out);
            }
        }
        _ => write_menu_item(root, &prefix, "    ", &mut out),
    }
    out.push_str("</ul>\n");
    out
}

fn write_menu_item(element: &Element, prefix: &str, indent: &str, out: &mut String) {
    match &element.body {
        ElementBody::Container(children) => {
            out.push_str(&format!("{}<li>{}\n", indent, element.name));
            out.push_str(&format!("{}    <ul>\n", indent));
            let nested = format!("{}        ", indent);
            for child in children {
                write_menu_item(child, prefix, &nested, out);
            }
            out.push_str(&format!("{}    </ul>\n", indent));
            out.push_str(&format!("{}</li>\n", indent));
        }
        ElementBody::Leaf(_) => {
            let namespace = if element.namespace.is_root() {
                String::new()
            } else {
                format!("{}/", element.namespace.to_slash_path())
            };
            out.push_str(&format!(
                "{}<li><a href=\"{}{}{}.html\">{}</a></li>\n",
                indent, prefix, namespace, element.name, element.name
            ));
        }
    }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error rendering a page.
    Page(PageError),

    /// An error creating a directory or writing an output file.
    Io { path: PathBuf, err: io::Error },
}

impl From<PageError> for Error {
    /// Converts a [`PageError`] into an [`Error`]. This allows us to use the
    /// `?` operator for page rendering.
    fn from(err: PageError) -> Error {
        Error::Page(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Page(err) => err.fmt(f),
            Error::Io { path, err } => write!(f, "Writing '{}': {}", path.display(), err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Page(err) => Some(err),
            Error::Io { path: _, err } => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Member;
    use pretty_assertions::assert_eq;

    fn tree() -> Element {
        Element::root(vec![
            Element::container(
                "Acme",
                ElementKind::Namespace,
                vec![
                    Element::leaf(
                        "Widget",
                        ElementKind::Class,
                        "",
                        vec![Member::method("Compute", "").param("System.Int32", "count", "")],
                    ),
                    Element::container(
                        "Gadgets",
                        ElementKind::Namespace,
                        vec![Element::leaf("Sprocket", ElementKind::Struct, "", vec![])],
                    ),
                ],
            ),
            Element::leaf("Loose", ElementKind::Class, "", vec![]),
        ])
    }

    #[test]
    fn test_relative_prefix() {
        assert_eq!(relative_prefix(0), "");
        assert_eq!(relative_prefix(1), "../");
        assert_eq!(relative_prefix(3), "../../../");
    }

    #[test]
    fn test_build_menu() {
        assert_eq!(
            build_menu(&tree(), 1),
            "<ul>\n\
             \x20   <li>Acme\n\
             \x20       <ul>\n\
             \x20           <li><a href=\"../Acme/Widget.html\">Widget</a></li>\n\
             \x20           <li>Gadgets\n\
             \x20               <ul>\n\
             \x20                   <li><a href=\"../Acme/Gadgets/Sprocket.html\">Sprocket</a></li>\n\
             \x20               </ul>\n\
             \x20           </li>\n\
             \x20       </ul>\n\
             \x20   </li>\n\
             \x20   <li><a href=\"../Loose.html\">Loose</a></li>\n\
             </ul>\n"
        );
    }

    #[test]
    fn test_menu_links_depend_only_on_depth() {
        let root = tree();
        assert!(build_menu(&root, 0).contains("href=\"Acme/Gadgets/Sprocket.html\""));
        assert!(build_menu(&root, 2).contains("href=\"../../Acme/Gadgets/Sprocket.html\""));
    }

    #[test]
    fn test_create_directories_is_idempotent() {
        let out = tempfile::tempdir().unwrap();
        let root = tree();
        for _ in 0..2 {
            let count = create_namespace_count(&root, out.path());
            assert_eq!(count, 2);
        }
        assert!(out.path().join("Acme").is_dir());
        assert!(out.path().join("Acme/Gadgets").is_dir());
        assert!(!out.path().join("Acme/Widget").exists());
        assert!(!out.path().join("Loose").exists());
    }

    fn create_namespace_count(root: &Element, dir: &Path) -> usize {
        let mut count = 0;
        create_namespace_directories(root, dir, &mut count).unwrap();
        count
    }
}
