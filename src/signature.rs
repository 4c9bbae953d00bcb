//! Builds the human-readable signatures of members and the anchors derived
//! from them. The text that is hashed into an anchor is also the label used
//! in the page's table of contents, so every TOC link lands on its section.
//!
//! Anchors for methods and constructors hash the declared name together with
//! the formatted parameter list, which keeps overloads apart. Properties and
//! enum items can't be overloaded and hash their name alone.

use crate::model::{Element, Member, MemberKind};
use crate::typename::resolve_type;
use sha2::{Digest, Sha256};
use std::fmt;

/// The default anchor hash: lowercase hex SHA-256.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Zips a member's parameter types with its parameter names, in declaration
/// order.
pub fn parameter_list(member: &Member) -> Result<Vec<(&str, &str)>, ParameterArityMismatch> {
    if member.parameter_types.len() != member.parameters.len() {
        return Err(ParameterArityMismatch {
            member: member.name.clone(),
            types: member.parameter_types.len(),
            names: member.parameters.len(),
        });
    }
    Ok(member
        .parameter_types
        .iter()
        .zip(member.parameters.iter())
        .map(|(t, p)| (t.as_str(), p.name.as_str()))
        .collect())
}

/// Formats a member's parameter list as `(int count, string name)`, or `()`
/// when it has no parameters.
pub fn format_signature(member: &Member) -> Result<String, ParameterArityMismatch> {
    let parameters: Vec<String> = parameter_list(member)?
        .into_iter()
        .map(|(type_name, name)| format!("{} {}", resolve_type(type_name), name))
        .collect();
    Ok(format!("({})", parameters.join(", ")))
}

/// The name a member is shown under. Constructors take the name of the type
/// that owns them.
pub fn declared_name<'a>(member: &'a Member, owner: &'a Element) -> &'a str {
    match member.kind {
        MemberKind::Constructor => &owner.name,
        _ => &member.name,
    }
}

/// A member's display name, parameter list, label and anchor, computed once
/// and shared by the page body and the table of contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedMember {
    /// See [`declared_name`].
    pub name: String,

    /// The formatted parameter list. Empty for properties and enum items.
    pub parameters: String,

    /// The text that was hashed: `name + parameters`.
    pub label: String,

    pub anchor: String,
}

/// Derives anchors with an injectable hash function.
pub struct Resolver {
    hash: Box<dyn Fn(&[u8]) -> String>,
}

impl Default for Resolver {
    fn default() -> Self {
        Resolver::new(sha256_hex)
    }
}

impl Resolver {
    pub fn new<F>(hash: F) -> Self
    where
        F: Fn(&[u8]) -> String + 'static,
    {
        Resolver {
            hash: Box::new(hash),
        }
    }

    /// Hashes `text` into an anchor id.
    pub fn anchor(&self, text: &str) -> String {
        (self.hash)(text.as_bytes())
    }

    pub fn resolve(
        &self,
        member: &Member,
        owner: &Element,
    ) -> Result<ResolvedMember, ParameterArityMismatch> {
        let name = declared_name(member, owner).to_owned();
        let parameters = match member.kind {
            MemberKind::Method | MemberKind::Constructor => format_signature(member)?,
            MemberKind::Property | MemberKind::EnumItem => String::new(),
        };
        let label = format!("{}{}", name, parameters);
        Ok(ResolvedMember {
            anchor: self.anchor(&label),
            name,
            parameters,
            label,
        })
    }
}

/// Returned when a member's parameter types and documented parameter names
/// differ in length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterArityMismatch {
    pub member: String,
    pub types: usize,
    pub names: usize,
}

impl fmt::Display for ParameterArityMismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "member `{}` has {} parameter types but {} documented parameters",
            self.member, self.types, self.names
        )
    }
}

impl std::error::Error for ParameterArityMismatch {}
