//! Loads page and fragment templates and fills their placeholders.
//!
//! A [`Template`] is parsed once and never changes afterwards. Placeholder
//! values live in a separate [`Bindings`] table which is built per render
//! (or reset and refilled per row), so nothing carries over from one render
//! to the next.
//!
//! Templates use Go template syntax via [`gtmpl`]: `{{.MethodName}}`
//! substitutes a value and `{{if .HasMethod}}...{{end}}` guards a section.
//! Every placeholder in the contract below is pre-seeded, as the empty
//! string or `false`, so an unassigned placeholder renders as nothing and an
//! unset flag hides its section.

use gtmpl::Value;
use pulldown_cmark::escape::escape_html;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

pub const PAGE_TEMPLATE: &str = "BaseTemplate.html";
pub const METHOD_TEMPLATE: &str = "BaseMethodTemplate.html";
pub const PROPERTY_TEMPLATE: &str = "BasePropertyTemplate.html";
pub const PARAMETER_TEMPLATE: &str = "BaseParameterTemplate.html";

/// Text placeholders every template may reference.
const TEXT_KEYS: &[&str] = &[
    "ClassName",
    "ClassComment",
    "Title",
    "Namespace",
    "RelativePath",
    "Menu",
    "Toc",
    "ConstructorItems",
    "MethodItems",
    "PropertyItems",
    "EnumItems",
    "MethodHash",
    "MethodName",
    "MethodParameters",
    "MethodComment",
    "MethodReturnComment",
    "Parameters",
    "PropertyHash",
    "PropertyName",
    "PropertyComment",
    "Type",
    "TypeName",
    "TypeComment",
];

/// Section flags every template may test.
const FLAG_KEYS: &[&str] = &[
    "HasConstructor",
    "HasMethod",
    "HasProperty",
    "HasEnum",
    "HasReturn",
    "HasParameter",
];

/// Picks the template file to load: the site-specific directory wins when it
/// has a file called `file_name`, otherwise the default directory's copy is
/// used.
pub fn resolve_template_path(
    site_dir: Option<&Path>,
    default_dir: &Path,
    file_name: &str,
) -> PathBuf {
    if let Some(site_dir) = site_dir {
        let candidate = site_dir.join(file_name);
        if candidate.is_file() {
            return candidate;
        }
    }
    default_dir.join(file_name)
}

/// A parsed template. Parsed once when loaded and only read afterwards.
pub struct Template {
    path: PathBuf,
    parsed: gtmpl::Template,
}

impl Template {
    /// Loads `file_name` from the site directory or, failing that, the
    /// default directory (see [`resolve_template_path`]).
    pub fn load(site_dir: Option<&Path>, default_dir: &Path, file_name: &str) -> Result<Template> {
        let path = resolve_template_path(site_dir, default_dir, file_name);
        if !path.is_file() {
            let mut searched: Vec<PathBuf> = site_dir.map(|d| d.join(file_name)).into_iter().collect();
            searched.push(path);
            return Err(Error::TemplateNotFound {
                file_name: file_name.to_owned(),
                searched,
            });
        }
        let text = std::fs::read_to_string(&path).map_err(|err| Error::Io {
            path: path.clone(),
            err,
        })?;
        Template::parse(path, text)
    }

    /// Parses template `text`. `path` is only used in error messages.
    pub fn parse<P: Into<PathBuf>>(path: P, text: String) -> Result<Template> {
        let path = path.into();
        let mut parsed = gtmpl::Template::default();
        parsed
            .parse(text.as_str())
            .map_err(|e| Error::Parse {
                path: path.clone(),
                message: e.to_string(),
            })?;
        tracing::debug!(path = %path.display(), "Loaded template");
        Ok(Template { path, parsed })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Renders the template with `bindings`.
    pub fn render(&self, bindings: &Bindings) -> Result<String> {
        let render_error = |message: String| Error::Render {
            path: self.path.clone(),
            message,
        };
        let context =
            gtmpl::Context::from(bindings.to_value()).map_err(|e| render_error(e.to_string()))?;
        let mut out = Vec::new();
        self.parsed
            .execute(&mut out, &context)
            .map_err(|e| render_error(e.to_string()))?;
        String::from_utf8(out).map_err(|e| render_error(e.to_string()))
    }
}

/// The placeholder table for one render.
#[derive(Clone)]
pub struct Bindings {
    values: HashMap<String, Value>,
}

impl Default for Bindings {
    fn default() -> Self {
        let mut bindings = Bindings {
            values: HashMap::with_capacity(TEXT_KEYS.len() + FLAG_KEYS.len()),
        };
        bindings.reset();
        bindings
    }
}

impl Bindings {
    pub fn new() -> Self {
        Bindings::default()
    }

    /// Assigns `value` to `key`, HTML-escaped. Overwrites any previous value.
    pub fn assign(&mut self, key: &str, value: &str) -> &mut Self {
        let mut escaped = String::with_capacity(value.len());
        // Writing into a `String` can't fail.
        let _ = escape_html(&mut escaped, value);
        self.values.insert(key.to_owned(), Value::String(escaped));
        self
    }

    /// Assigns pre-rendered HTML to `key` without escaping it.
    pub fn assign_raw<S: Into<String>>(&mut self, key: &str, html: S) -> &mut Self {
        self.values.insert(key.to_owned(), Value::String(html.into()));
        self
    }

    /// Turns on the section flag `key`.
    pub fn flag(&mut self, key: &str) -> &mut Self {
        self.values.insert(key.to_owned(), Value::Bool(true));
        self
    }

    /// Drops every assignment, leaving only the empty defaults.
    pub fn reset(&mut self) {
        self.values.clear();
        for key in TEXT_KEYS {
            self.values
                .insert((*key).to_owned(), Value::String(String::new()));
        }
        for key in FLAG_KEYS {
            self.values.insert((*key).to_owned(), Value::Bool(false));
        }
    }

    fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }
}

/// The result of a template operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading or rendering a template.
#[derive(Debug)]
pub enum Error {
    /// Returned when neither the site directory nor the default directory
    /// has the requested template.
    TemplateNotFound {
        file_name: String,
        searched: Vec<PathBuf>,
    },

    /// Returned when a template file can't be read.
    Io { path: PathBuf, err: io::Error },

    /// Returned when a template file isn't valid template syntax.
    Parse { path: PathBuf, message: String },

    /// Returned when executing a template fails.
    Render { path: PathBuf, message: String },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::TemplateNotFound {
                file_name,
                searched,
            } => {
                let searched: Vec<String> =
                    searched.iter().map(|p| p.display().to_string()).collect();
                write!(
                    f,
                    "Template `{}` not found (searched {})",
                    file_name,
                    searched.join(", ")
                )
            }
            Error::Io { path, err } => {
                write!(f, "Reading template file '{}': {}", path.display(), err)
            }
            Error::Parse { path, message } => {
                write!(f, "Parsing template '{}': {}", path.display(), message)
            }
            Error::Render { path, message } => {
                write!(f, "Rendering template '{}': {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { path: _, err } => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn parse(text: &str) -> Template {
        Template::parse("inline.html", text.to_owned()).unwrap()
    }

    #[test]
    fn test_resolve_prefers_site_directory() {
        let site = tempfile::tempdir().unwrap();
        let base = tempfile::tempdir().unwrap();
        fs::write(base.path().join(PAGE_TEMPLATE), "base").unwrap();
        fs::write(base.path().join(METHOD_TEMPLATE), "base").unwrap();
        fs::write(site.path().join(PAGE_TEMPLATE), "site").unwrap();

        assert_eq!(
            resolve_template_path(Some(site.path()), base.path(), PAGE_TEMPLATE),
            site.path().join(PAGE_TEMPLATE)
        );
        assert_eq!(
            resolve_template_path(Some(site.path()), base.path(), METHOD_TEMPLATE),
            base.path().join(METHOD_TEMPLATE)
        );
        assert_eq!(
            resolve_template_path(None, base.path(), PAGE_TEMPLATE),
            base.path().join(PAGE_TEMPLATE)
        );
    }

    #[test]
    fn test_load_missing_template() {
        let site = tempfile::tempdir().unwrap();
        let base = tempfile::tempdir().unwrap();
        match Template::load(Some(site.path()), base.path(), PROPERTY_TEMPLATE) {
            Err(Error::TemplateNotFound {
                file_name,
                searched,
            }) => {
                assert_eq!(file_name, PROPERTY_TEMPLATE);
                assert_eq!(searched.len(), 2);
            }
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("expected TemplateNotFound"),
        }
    }

    #[test]
    fn test_load_falls_back_to_default() {
        let site = tempfile::tempdir().unwrap();
        let base = tempfile::tempdir().unwrap();
        fs::write(base.path().join(PARAMETER_TEMPLATE), "<td>{{.Type}}</td>").unwrap();
        let template = Template::load(Some(site.path()), base.path(), PARAMETER_TEMPLATE).unwrap();
        assert_eq!(template.path(), base.path().join(PARAMETER_TEMPLATE));
    }

    #[test]
    fn test_assign_escapes_and_raw_does_not() {
        let template = parse("{{.ClassName}}|{{.Menu}}");
        let mut bindings = Bindings::new();
        bindings
            .assign("ClassName", "List<T> & co")
            .assign_raw("Menu", "<ul></ul>");
        assert_eq!(
            template.render(&bindings).unwrap(),
            "List&lt;T&gt; &amp; co|<ul></ul>"
        );
    }

    #[test]
    fn test_last_assignment_wins() {
        let template = parse("{{.Title}}");
        let mut bindings = Bindings::new();
        bindings.assign("Title", "first").assign("Title", "second");
        assert_eq!(template.render(&bindings).unwrap(), "second");
    }

    #[test]
    fn test_unassigned_placeholders_render_empty() {
        let template = parse("[{{.MethodReturnComment}}]{{if .HasReturn}}returns{{end}}");
        assert_eq!(template.render(&Bindings::new()).unwrap(), "[]");
    }

    #[test]
    fn test_flags_show_sections() {
        let template = parse("{{if .HasMethod}}methods{{end}}");
        let mut bindings = Bindings::new();
        bindings.flag("HasMethod");
        assert_eq!(template.render(&bindings).unwrap(), "methods");
    }

    #[test]
    fn test_reset_between_rows() {
        let template = parse("<tr>{{.Type}}:{{.TypeName}}:{{.TypeComment}}</tr>");
        let mut bindings = Bindings::new();
        let mut rows = String::new();

        bindings
            .assign("Type", "int")
            .assign("TypeName", "count")
            .assign("TypeComment", "How many.");
        rows.push_str(&template.render(&bindings).unwrap());
        bindings.reset();

        bindings.assign("Type", "string").assign("TypeName", "label");
        rows.push_str(&template.render(&bindings).unwrap());

        assert_eq!(
            rows,
            "<tr>int:count:How many.</tr><tr>string:label:</tr>"
        );
    }

    #[test]
    fn test_parsed_template_renders_repeatedly() {
        let template = parse("<li>{{.PropertyName}}</li>");
        let mut bindings = Bindings::new();
        let mut out = String::new();
        for name in &["Ready", "Count", "Label"] {
            bindings.assign("PropertyName", name);
            out.push_str(&template.render(&bindings).unwrap());
        }
        assert_eq!(out, "<li>Ready</li><li>Count</li><li>Label</li>");
    }

    #[test]
    fn test_parse_error() {
        match Template::parse("broken.html", "{{.ClassName".to_owned()) {
            Err(Error::Parse { path, .. }) => assert_eq!(path, PathBuf::from("broken.html")),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("expected a parse error"),
        }
    }
}
