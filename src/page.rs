//! Renders the page for one documented type. Members are dispatched by kind
//! into four sections (constructors, methods, properties, enum items); each
//! member becomes a fragment rendered from its own template, and the
//! fragments are injected into the page template together with the table of
//! contents and the sitewide menu.

use crate::markup::comment_html;
use crate::model::{Element, Member, MemberKind};
use crate::signature::{ParameterArityMismatch, ResolvedMember, Resolver};
use crate::template::{
    self, Bindings, Template, METHOD_TEMPLATE, PAGE_TEMPLATE, PARAMETER_TEMPLATE,
    PROPERTY_TEMPLATE,
};
use crate::typename::resolve_type;
use crate::write::{build_menu, relative_prefix};
use std::fmt;
use std::path::Path;

/// The four templates a site is rendered with. Loaded once per build.
pub struct Templates {
    /// The whole page.
    pub page: Template,

    /// One method or constructor.
    pub method: Template,

    /// One property or enum item.
    pub property: Template,

    /// One row of a method's parameter table.
    pub parameter: Template,
}

impl Templates {
    /// Loads every template, preferring `site_dir` over `default_dir` file by
    /// file.
    pub fn load(site_dir: Option<&Path>, default_dir: &Path) -> template::Result<Templates> {
        Ok(Templates {
            page: Template::load(site_dir, default_dir, PAGE_TEMPLATE)?,
            method: Template::load(site_dir, default_dir, METHOD_TEMPLATE)?,
            property: Template::load(site_dir, default_dir, PROPERTY_TEMPLATE)?,
            parameter: Template::load(site_dir, default_dir, PARAMETER_TEMPLATE)?,
        })
    }
}

/// The sections of a page in the order they appear in the table of contents.
const SECTIONS: &[(MemberKind, &str)] = &[
    (MemberKind::Constructor, "Constructor"),
    (MemberKind::Method, "Methods"),
    (MemberKind::Property, "Properties"),
    (MemberKind::EnumItem, "Enums"),
];

/// Accumulates the rendered fragments of each section.
#[derive(Default)]
struct Sections {
    constructors: String,
    methods: String,
    properties: String,
    enums: String,
}

/// Renders type pages.
pub struct PageRenderer<'a> {
    templates: &'a Templates,
    resolver: Resolver,
}

impl<'a> PageRenderer<'a> {
    pub fn new(templates: &'a Templates) -> Self {
        PageRenderer::with_resolver(templates, Resolver::default())
    }

    pub fn with_resolver(templates: &'a Templates, resolver: Resolver) -> Self {
        PageRenderer {
            templates,
            resolver,
        }
    }

    /// Renders the page for the leaf `owner`. `root` is the root of the whole
    /// tree and is used to build the menu. Fails without rendering anything
    /// if any member's parameters are inconsistent.
    pub fn render_page(&self, owner: &Element, root: &Element) -> Result<Vec<u8>> {
        let resolved = self.resolve_members(owner)?;

        let mut page = Bindings::new();
        let mut sections = Sections::default();
        for (member, resolved) in owner.members().iter().zip(resolved.iter()) {
            match member.kind {
                MemberKind::Method => {
                    sections.methods.push_str(&self.render_method(member, resolved)?);
                    page.flag("HasMethod");
                }
                MemberKind::Constructor => {
                    sections
                        .constructors
                        .push_str(&self.render_method(member, resolved)?);
                    page.flag("HasConstructor");
                }
                MemberKind::Property => {
                    sections
                        .properties
                        .push_str(&self.render_property(member, resolved)?);
                    page.flag("HasProperty");
                }
                MemberKind::EnumItem => {
                    sections.enums.push_str(&self.render_property(member, resolved)?);
                    page.flag("HasEnum");
                }
            }
        }

        let depth = owner.depth();
        let title = format!("{} {}", owner.name, owner.kind);
        page.assign("RelativePath", &relative_prefix(depth))
            .assign("ClassName", &title)
            .assign("Title", &title)
            .assign_raw("ClassComment", comment_html(&owner.comment))
            .assign("Namespace", &owner.namespace.to_string())
            .assign_raw("Menu", build_menu(root, depth))
            .assign_raw("Toc", toc(owner.members(), &resolved))
            .assign_raw("ConstructorItems", sections.constructors)
            .assign_raw("MethodItems", sections.methods)
            .assign_raw("PropertyItems", sections.properties)
            .assign_raw("EnumItems", sections.enums);

        tracing::debug!(
            page = %owner.name,
            namespace = %owner.namespace,
            members = owner.members().len(),
            "Rendered page"
        );
        Ok(self.templates.page.render(&page)?.into_bytes())
    }

    fn resolve_members(&self, owner: &Element) -> Result<Vec<ResolvedMember>> {
        owner
            .members()
            .iter()
            .map(|member| {
                self.resolver
                    .resolve(member, owner)
                    .map_err(|err| Error::Member {
                        owner: owner.name.clone(),
                        err,
                    })
            })
            .collect()
    }

    fn render_method(&self, member: &Member, resolved: &ResolvedMember) -> Result<String> {
        let mut method = Bindings::new();
        method
            .assign("MethodHash", &resolved.anchor)
            .assign("MethodName", &resolved.name)
            // Already HTML: generic brackets are entities by now.
            .assign_raw("MethodParameters", resolved.parameters.as_str())
            .assign_raw("MethodComment", comment_html(&member.comment));

        if !member.return_comment.is_empty() {
            method
                .assign_raw("MethodReturnComment", comment_html(&member.return_comment))
                .flag("HasReturn");
        }

        let rows = self.render_parameter_rows(member)?;
        if !rows.is_empty() {
            method.assign_raw("Parameters", rows).flag("HasParameter");
        }

        Ok(self.templates.method.render(&method)?)
    }

    fn render_property(&self, member: &Member, resolved: &ResolvedMember) -> Result<String> {
        let mut property = Bindings::new();
        property
            .assign("PropertyHash", &resolved.anchor)
            .assign("PropertyName", &resolved.name)
            .assign_raw("PropertyComment", comment_html(&member.comment));
        Ok(self.templates.property.render(&property)?)
    }

    /// One row per parameter, in declaration order, all rendered through a
    /// single reset-between-rows table.
    fn render_parameter_rows(&self, member: &Member) -> Result<String> {
        let mut rows = String::new();
        let mut row = Bindings::new();
        for (type_name, parameter) in member.parameter_types.iter().zip(member.parameters.iter()) {
            row.assign_raw("Type", resolve_type(type_name))
                .assign("TypeName", &parameter.name)
                .assign_raw("TypeComment", comment_html(&parameter.comment));
            rows.push_str(&self.templates.parameter.render(&row)?);
            row.reset();
        }
        Ok(rows)
    }
}

/// Builds the table of contents: a heading and an ordered list for every
/// section that has members. Entry labels are the same text that was hashed
/// into each member's anchor.
fn toc(members: &[Member], resolved: &[ResolvedMember]) -> String {
    let mut out = String::new();
    for (kind, heading) in SECTIONS {
        let entries: Vec<String> = members
            .iter()
            .zip(resolved.iter())
            .filter(|(member, _)| member.kind == *kind)
            .map(|(_, r)| format!("    <li><a href=\"#{}\">{}</a></li>\n", r.anchor, r.label))
            .collect();
        if entries.is_empty() {
            continue;
        }
        out.push_str(&format!("<h3>{}</h3>\n<ol>\n", heading));
        for entry in entries {
            out.push_str(&entry);
        }
        out.push_str("</ol>\n");
    }
    out
}

/// The result of a page-rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error rendering a page.
#[derive(Debug)]
pub enum Error {
    /// An error filling a template.
    Template(template::Error),

    /// A member of `owner` whose parameter types and names don't line up.
    Member {
        owner: String,
        err: ParameterArityMismatch,
    },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::Member { owner, err } => write!(f, "rendering `{}`: {}", owner, err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(err) => Some(err),
            Error::Member { owner: _, err } => Some(err),
        }
    }
}

impl From<template::Error> for Error {
    /// Converts a [`template::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for template operations.
    fn from(err: template::Error) -> Error {
        Error::Template(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementKind, Parameter};
    use pretty_assertions::assert_eq;

    fn plain(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    fn templates() -> Templates {
        let parse = |name: &str, text: &str| Template::parse(name, text.to_owned()).unwrap();
        Templates {
            page: parse(
                PAGE_TEMPLATE,
                "{{.Title}}|{{.Namespace}}|{{.RelativePath}}|{{.ClassComment}}\n\
                 {{.Toc}}\
                 {{if .HasConstructor}}C[{{.ConstructorItems}}]{{end}}\
                 {{if .HasMethod}}M[{{.MethodItems}}]{{end}}\
                 {{if .HasProperty}}P[{{.PropertyItems}}]{{end}}\
                 {{if .HasEnum}}E[{{.EnumItems}}]{{end}}",
            ),
            method: parse(
                METHOD_TEMPLATE,
                "<{{.MethodHash}}|{{.MethodName}}{{.MethodParameters}}|{{.MethodComment}}\
                 {{if .HasParameter}}|{{.Parameters}}{{end}}\
                 {{if .HasReturn}}|returns {{.MethodReturnComment}}{{end}}>",
            ),
            property: parse(
                PROPERTY_TEMPLATE,
                "<{{.PropertyHash}}|{{.PropertyName}}|{{.PropertyComment}}>",
            ),
            parameter: parse(
                PARAMETER_TEMPLATE,
                "({{.Type}} {{.TypeName}}: {{.TypeComment}})",
            ),
        }
    }

    fn render(owner: Element) -> Result<String> {
        let root = Element::root(vec![Element::container(
            "Acme",
            ElementKind::Namespace,
            vec![owner],
        )]);
        let owner = &root.namespaces()[0].namespaces()[0];
        let templates = templates();
        let renderer = PageRenderer::with_resolver(&templates, Resolver::new(plain));
        let page = renderer.render_page(owner, &root)?;
        Ok(String::from_utf8(page).unwrap())
    }

    fn body(page: &str) -> &str {
        page.rsplit("</ol>\n").next().unwrap()
    }

    #[test]
    fn test_sections_follow_member_kinds() {
        let page = render(Element::leaf(
            "Widget",
            ElementKind::Class,
            "A <c>Widget</c>.",
            vec![
                Member::constructor("Creates one."),
                Member::method("Compute", "Adds <c>count</c>.")
                    .param("System.Int32", "count", "How many.")
                    .returns("System.Int32", "The sum."),
                Member::property("Ready", "Whether it is <ready>."),
                Member::method("Reset", ""),
            ],
        ))
        .unwrap();

        assert!(page.starts_with(
            "Widget Class|Acme|../|A <span class=\"specific-element\">Widget</span>.\n"
        ));
        assert_eq!(
            body(&page),
            "C[<Widget()|Widget()|Creates one.>]\
             M[<Compute(int count)|Compute(int count)|Adds <span class=\"specific-element\">count</span>.\
             |(int count: How many.)|returns The sum.>\
             <Reset()|Reset()|>]\
             P[<Ready|Ready|Whether it is &lt;ready&gt;.>]"
        );
    }

    #[test]
    fn test_empty_sections_are_absent() {
        let page = render(Element::leaf(
            "Color",
            ElementKind::Enum,
            "",
            vec![Member::enum_item("Red", ""), Member::enum_item("Green", "")],
        ))
        .unwrap();
        assert_eq!(body(&page), "E[<Red|Red|><Green|Green|>]");
        assert!(!page.contains("C["));
        assert!(!page.contains("M["));
        assert!(!page.contains("P["));
    }

    #[test]
    fn test_toc_labels_match_anchors() {
        let page = render(Element::leaf(
            "Widget",
            ElementKind::Class,
            "",
            vec![
                Member::property("Ready", ""),
                Member::method("Compute", "").param("System.Int32", "count", ""),
                Member::method("Compute", "").param("System.String", "name", ""),
                Member::constructor(""),
            ],
        ))
        .unwrap();
        let toc = &page[page.find("<h3>").unwrap()..page.rfind("</ol>\n").unwrap() + 6];
        assert_eq!(
            toc,
            "<h3>Constructor</h3>\n<ol>\n    <li><a href=\"#Widget()\">Widget()</a></li>\n</ol>\n\
             <h3>Methods</h3>\n<ol>\n    <li><a href=\"#Compute(int count)\">Compute(int count)</a></li>\n    \
             <li><a href=\"#Compute(string name)\">Compute(string name)</a></li>\n</ol>\n\
             <h3>Properties</h3>\n<ol>\n    <li><a href=\"#Ready\">Ready</a></li>\n</ol>\n"
        );
    }

    #[test]
    fn test_parameter_rows_do_not_bleed() {
        let member = Member::method("Blend", "")
            .param("System.Byte", "alpha", "Opacity.")
            .param("System.Collections.Generic.List{System.Int64}", "weights", "");
        let page = render(Element::leaf("Mixer", ElementKind::Class, "", vec![member])).unwrap();
        assert!(page.contains(
            "|(byte alpha: Opacity.)(System.Collections.Generic.List&lt;long&gt; weights: )>"
        ));
    }

    #[test]
    fn test_arity_mismatch_renders_nothing() {
        let mut member = Member::method("Compute", "");
        member.parameter_types = vec!["System.Int32".to_owned(), "System.String".to_owned()];
        member.parameters = vec![Parameter {
            name: "count".to_owned(),
            comment: String::new(),
        }];
        match render(Element::leaf("Widget", ElementKind::Class, "", vec![member])) {
            Err(Error::Member { owner, err }) => {
                assert_eq!(owner, "Widget");
                assert_eq!(err.types, 2);
                assert_eq!(err.names, 1);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
