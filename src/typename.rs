//! Converts the fully-qualified type names found in documentation ids into
//! the short names a reader expects (`System.Int32` becomes `int`), and
//! escapes the `{`/`}` stand-ins that documentation ids use for generic
//! argument brackets.

/// Fully-qualified primitive types and their keyword aliases.
const ALIASES: &[(&str, &str)] = &[
    ("System.Byte", "byte"),
    ("System.SByte", "sbyte"),
    ("System.Int16", "short"),
    ("System.UInt16", "ushort"),
    ("System.Int32", "int"),
    ("System.UInt32", "uint"),
    ("System.Int64", "long"),
    ("System.UInt64", "ulong"),
    ("System.Single", "float"),
    ("System.Double", "double"),
    ("System.Decimal", "decimal"),
    ("System.Boolean", "bool"),
    ("System.Char", "char"),
    ("System.String", "string"),
    ("System.Object", "object"),
    ("System.Void", "void"),
];

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Resolves a raw parameter or return type name for display. Aliases only
/// replace whole identifiers, so `System.Int32Converter` is left alone. The
/// generic brackets are escaped last, after every alias has been applied.
pub fn resolve_type(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    let mut prev: Option<char> = None;

    'scan: while let Some(c) = rest.chars().next() {
        let at_boundary = prev.map_or(true, |p| !is_ident_char(p) && p != '.');
        if at_boundary {
            for (qualified, alias) in ALIASES {
                if let Some(tail) = rest.strip_prefix(qualified) {
                    if !tail.chars().next().map_or(false, is_ident_char) {
                        out.push_str(alias);
                        rest = tail;
                        prev = qualified.chars().last();
                        continue 'scan;
                    }
                }
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
        prev = Some(c);
    }

    escape_generic_brackets(&out)
}

fn escape_generic_brackets(s: &str) -> String {
    s.replace('{', "&lt;").replace('}', "&gt;")
}
