//! The library code for the `xmldoc-site` documentation site generator. The
//! architecture can be generally broken down into two distinct steps:
//!
//! 1. Loading the documented symbol tree from disk ([`crate::model`])
//! 2. Converting the tree into output files on disk ([`crate::write`])
//!
//! Of the two, the second step is the more involved. It is itself composed of
//! three distinct sub-steps:
//!
//! 1. Creating one directory per namespace
//! 2. Rendering one page per type
//! 3. Copying the static assets
//!
//! The second sub-step does most of the work. Every member of a type is
//! resolved into a display signature and a stable anchor ([`crate::signature`]),
//! grouped into constructor, method, property and enum sections, and rendered
//! through small fragment templates ([`crate::template`]) before the page
//! template stitches the sections, a table of contents and the sitewide menu
//! together ([`crate::page`]). Type names are shortened to their keyword
//! aliases ([`crate::typename`]) and inline `<c>` code spans in comments are
//! rewritten into styled spans ([`crate::markup`]).
//!
//! The third sub-step never overwrites anything: an asset whose destination
//! already exists is left alone, so a site can be rebuilt in place.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod markup;
pub mod model;
pub mod page;
pub mod signature;
pub mod template;
pub mod typename;
pub mod write;
