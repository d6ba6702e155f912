//! The library code for the `orgblog` static blog builder. The architecture
//! can be generally broken down into two distinct steps:
//!
//! 1. Loading posts into memory from the post index and the org-exported
//!    HTML content files ([`crate::index`], [`crate::extract`],
//!    [`crate::post`])
//! 2. Converting the posts into output files on disk ([`crate::write`])
//!
//! Of the two, the second step is the more involved. It is itself composed
//! of three distinct sub-steps:
//!
//! 1. Building post pages
//! 2. Building index pages
//! 3. Rendering all pages to disk
//!
//! Again here the second sub-step is the more involved, because we need to
//! create groups of index pages for each tag and another group for the
//! empty tag which corresponds to all posts. A group of index pages is
//! referred to as an "index", and each index is paginated--converted into
//! groups of pages based on a configurable number of posts per index page,
//! with a pager widget ([`crate::query::page_links`]) linking the pages
//! together.
//!
//! The third substep is pretty straight-forward: for each page, apply the
//! template (either the post template or the index template) and write the
//! result to disk.
//!
//! [`crate::query`] additionally supports ad-hoc filtering of the loaded
//! posts by search term and category, which backs the `list` subcommand.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod extract;
pub mod index;
pub mod post;
pub mod query;
pub mod tag;
pub mod util;
pub mod write;
