//! Defines the symbol tree that the site builder consumes: [`Element`] nodes
//! (namespaces and documented types) and the [`Member`]s owned by documented
//! types. The tree is produced upstream by a documentation-comment parser and
//! handed to this crate as a YAML dump (see [`load_tree`]); once loaded it is
//! only ever read.
//!
//! An [`Element`] is either a container (a namespace, or the root) holding
//! child elements, or a leaf (a class, struct, enum, ...) holding members.
//! The two shapes are modeled by [`ElementBody`] so a node can never be both.

use crate::signature::{declared_name, format_signature};
use serde::Deserialize;
use std::convert::TryFrom;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// The kind of an [`Element`]. Displayed as-is in page titles (e.g. `Widget
/// Class`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum ElementKind {
    Root,
    Namespace,
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ElementKind::Root => "Root",
            ElementKind::Namespace => "Namespace",
            ElementKind::Class => "Class",
            ElementKind::Struct => "Struct",
            ElementKind::Interface => "Interface",
            ElementKind::Enum => "Enum",
            ElementKind::Delegate => "Delegate",
        })
    }
}

/// The kind of a [`Member`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum MemberKind {
    Method,
    Constructor,
    Property,
    EnumItem,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            MemberKind::Method => "Method",
            MemberKind::Constructor => "Constructor",
            MemberKind::Property => "Property",
            MemberKind::EnumItem => "EnumItem",
        })
    }
}

/// The dotted namespace of an element, stored as its segments. The root
/// namespace has no segments. The number of segments is the element's depth
/// below the output root, which is what relative links are computed from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NamespacePath(Vec<String>);

impl NamespacePath {
    /// The empty namespace of the root and of its direct children.
    pub fn root() -> NamespacePath {
        NamespacePath::default()
    }

    /// Returns a new path with `name` appended.
    pub fn child(&self, name: &str) -> NamespacePath {
        let mut segments = self.0.clone();
        segments.push(name.to_owned());
        NamespacePath(segments)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }

    /// The namespace as a `/`-separated relative path, e.g. `Acme/Gadgets`
    /// for `Acme.Gadgets`.
    pub fn to_slash_path(&self) -> String {
        self.0.join("/")
    }
}

impl fmt::Display for NamespacePath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl From<&str> for NamespacePath {
    /// Parses a dotted namespace such as `Acme.Gadgets`. The empty string is
    /// the root namespace.
    fn from(dotted: &str) -> NamespacePath {
        NamespacePath(
            dotted
                .split('.')
                .filter(|s| !s.is_empty())
                .map(|s| s.to_owned())
                .collect(),
        )
    }
}

/// A documented parameter name and its comment. A member's parameters are
/// positionally aligned with its `parameter_types`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Parameter {
    pub name: String,

    #[serde(default)]
    pub comment: String,
}

fn void() -> String {
    String::from("System.Void")
}

/// A documented method, constructor, property or enum item.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Member {
    pub name: String,

    pub kind: MemberKind,

    /// Fully-qualified parameter type names in declaration order.
    #[serde(default)]
    pub parameter_types: Vec<String>,

    /// Parameter names and comments in declaration order.
    #[serde(default)]
    pub parameters: Vec<Parameter>,

    #[serde(default = "void")]
    pub return_type: String,

    /// Empty when the member documents no return value.
    #[serde(default)]
    pub return_comment: String,

    /// The summary comment. May contain inline `<c>` code spans.
    #[serde(default)]
    pub comment: String,
}

impl Member {
    pub fn new(kind: MemberKind, name: &str, comment: &str) -> Member {
        Member {
            name: name.to_owned(),
            kind,
            parameter_types: Vec::new(),
            parameters: Vec::new(),
            return_type: void(),
            return_comment: String::new(),
            comment: comment.to_owned(),
        }
    }

    pub fn method(name: &str, comment: &str) -> Member {
        Member::new(MemberKind::Method, name, comment)
    }

    /// Constructors are stored under a placeholder name (`#ctor` in .NET
    /// documentation ids); pages show them under the owning type's name.
    pub fn constructor(comment: &str) -> Member {
        Member::new(MemberKind::Constructor, "#ctor", comment)
    }

    pub fn property(name: &str, comment: &str) -> Member {
        Member::new(MemberKind::Property, name, comment)
    }

    pub fn enum_item(name: &str, comment: &str) -> Member {
        Member::new(MemberKind::EnumItem, name, comment)
    }

    /// Appends a parameter, keeping types and names aligned.
    pub fn param(mut self, type_name: &str, name: &str, comment: &str) -> Member {
        self.parameter_types.push(type_name.to_owned());
        self.parameters.push(Parameter {
            name: name.to_owned(),
            comment: comment.to_owned(),
        });
        self
    }

    pub fn returns(mut self, type_name: &str, comment: &str) -> Member {
        self.return_type = type_name.to_owned();
        self.return_comment = comment.to_owned();
        self
    }
}

/// The two shapes an [`Element`] can take.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementBody {
    /// The root or a namespace; holds child elements.
    Container(Vec<Element>),

    /// A documented type; holds its members.
    Leaf(Vec<Member>),
}

/// A node in the symbol tree.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawElement")]
pub struct Element {
    pub name: String,

    pub kind: ElementKind,

    pub comment: String,

    /// The namespace containing this element. For `Acme.Widget` this is
    /// `Acme`; for a top-level namespace it is the root namespace.
    pub namespace: NamespacePath,

    pub body: ElementBody,
}

impl Element {
    pub fn container(name: &str, kind: ElementKind, children: Vec<Element>) -> Element {
        Element {
            name: name.to_owned(),
            kind,
            comment: String::new(),
            namespace: NamespacePath::root(),
            body: ElementBody::Container(children),
        }
    }

    pub fn leaf(name: &str, kind: ElementKind, comment: &str, members: Vec<Member>) -> Element {
        Element {
            name: name.to_owned(),
            kind,
            comment: comment.to_owned(),
            namespace: NamespacePath::root(),
            body: ElementBody::Leaf(members),
        }
    }

    /// Builds the root of a symbol tree and assigns every descendant's
    /// namespace from its position in the hierarchy.
    pub fn root(children: Vec<Element>) -> Element {
        let mut root = Element::container("", ElementKind::Root, children);
        root.assign_namespaces(&NamespacePath::root());
        root
    }

    fn assign_namespaces(&mut self, namespace: &NamespacePath) {
        self.namespace = namespace.clone();
        let inner = match self.kind {
            ElementKind::Root => namespace.clone(),
            _ => namespace.child(&self.name),
        };
        if let ElementBody::Container(children) = &mut self.body {
            for child in children {
                child.assign_namespaces(&inner);
            }
        }
    }

    /// Child elements; empty for leaves.
    pub fn namespaces(&self) -> &[Element] {
        match &self.body {
            ElementBody::Container(children) => children,
            ElementBody::Leaf(_) => &[],
        }
    }

    /// Documented members; empty for containers.
    pub fn members(&self) -> &[Member] {
        match &self.body {
            ElementBody::Container(_) => &[],
            ElementBody::Leaf(members) => members,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.body, ElementBody::Leaf(_))
    }

    /// The number of namespace segments above this element, i.e. how many
    /// directories deep its page (or directory) sits below the output root.
    pub fn depth(&self) -> usize {
        self.namespace.depth()
    }

    /// Parses a symbol tree from YAML and assigns namespaces. The top-level
    /// node must be of kind [`ElementKind::Root`].
    pub fn from_yaml<R: io::Read>(reader: R) -> Result<Element> {
        let mut root: Element = serde_yaml::from_reader(reader)?;
        if root.kind != ElementKind::Root {
            return Err(Error::NotRoot(root.kind));
        }
        root.assign_namespaces(&NamespacePath::root());
        Ok(root)
    }

    /// Renders an indented listing of the tree, one line per element and per
    /// member. Used for inspecting parser output without building a site.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        match self.kind {
            ElementKind::Root => {
                for child in self.namespaces() {
                    child.write_outline(&mut out, 0);
                }
            }
            _ => self.write_outline(&mut out, 0),
        }
        out
    }

    fn write_outline(&self, out: &mut String, indent: usize) {
        use std::fmt::Write;
        let pad = " ".repeat(indent);
        let _ = writeln!(out, "{}> {} ({})", pad, self.name, self.kind);
        match &self.body {
            ElementBody::Container(children) => {
                for child in children {
                    child.write_outline(out, indent + 2);
                }
            }
            ElementBody::Leaf(members) => {
                for member in members {
                    let name = declared_name(member, self);
                    let _ = match member.kind {
                        MemberKind::Method | MemberKind::Constructor => {
                            match format_signature(member) {
                                Ok(signature) => writeln!(
                                    out,
                                    "{}  - {}: {}{}",
                                    pad, member.kind, name, signature
                                ),
                                Err(err) => {
                                    writeln!(out, "{}  - {}: {} ({})", pad, member.kind, name, err)
                                }
                            }
                        }
                        _ => writeln!(out, "{}  - {}: {}", pad, member.kind, name),
                    };
                }
            }
        }
    }
}

/// The serialized form of an [`Element`]. Both `namespaces` and `members`
/// are optional so the parser can omit whichever does not apply.
#[derive(Deserialize)]
struct RawElement {
    #[serde(default)]
    name: String,

    kind: ElementKind,

    #[serde(default)]
    comment: String,

    namespaces: Option<Vec<Element>>,

    members: Option<Vec<Member>>,
}

impl TryFrom<RawElement> for Element {
    type Error = ShapeError;

    fn try_from(raw: RawElement) -> std::result::Result<Element, ShapeError> {
        let body = match (raw.namespaces, raw.members) {
            (Some(children), None) => ElementBody::Container(children),
            (None, Some(members)) => ElementBody::Leaf(members),
            (None, None) => match raw.kind {
                ElementKind::Root | ElementKind::Namespace => ElementBody::Container(Vec::new()),
                _ => ElementBody::Leaf(Vec::new()),
            },
            (Some(children), Some(members)) => {
                if members.is_empty() {
                    ElementBody::Container(children)
                } else if children.is_empty() {
                    ElementBody::Leaf(members)
                } else {
                    return Err(ShapeError(raw.name));
                }
            }
        };
        Ok(Element {
            name: raw.name,
            kind: raw.kind,
            comment: raw.comment,
            namespace: NamespacePath::root(),
            body,
        })
    }
}

/// Loads a symbol tree from a YAML file on disk.
pub fn load_tree(path: &Path) -> Result<Element> {
    let file = File::open(path).map_err(|err| Error::Open {
        path: path.to_owned(),
        err,
    })?;
    Element::from_yaml(io::BufReader::new(file))
}

/// Returned when a serialized element has both child namespaces and
/// members.
#[derive(Debug)]
pub struct ShapeError(String);

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "element `{}` has both child namespaces and members",
            self.0
        )
    }
}

impl std::error::Error for ShapeError {}

/// The result of loading a symbol tree.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading a symbol tree.
#[derive(Debug)]
pub enum Error {
    /// Returned when the symbols file can't be opened.
    Open { path: PathBuf, err: io::Error },

    /// Returned when the YAML is malformed or an element has an invalid
    /// shape.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when the top-level node isn't the root.
    NotRoot(ElementKind),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(f, "Opening symbols file '{}': {}", path.display(), err)
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::NotRoot(kind) => {
                write!(f, "top-level element must be Root, found {}", kind)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::DeserializeYaml(err) => Some(err),
            Error::NotRoot(_) => None,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}
