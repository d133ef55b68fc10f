#![doc = svgbobdoc::transform!(
//! A schema-less engine for rendering and filtering the content of small
//! sites.
//!
//! # Overview
//!
//! Trellis takes collections of _records_, trees of fields whose values are
//! text, lists, or further records, with no fixed schema, and derives the
//! views of a content site from them: detail pages, filtered listings,
//! category hierarchies, event calendars, and search suggestions.
//!
//! ```svgbob
//!   +----------------+
//!   | content source |
//!   +-------+--------+
//!           |  Collection
//!           v
//!   +----------------+      +--------+----------+-------+
//!   |      walk      +----->| render | matcher  | group |
//!   +----------------+      +---+----+----+-----+---+---+
//!                               |         |         |
//!                               |      +--+---+     |
//!                               +----->| link |<----+
//!                                      +--+---+
//!                                         |
//!                                         v
//!                               +--------------------+
//!                               |  display :: Page   |
//!                               +--------------------+
//! ```
//!
//! A content domain is described by a [`DisplayConfig`](config::DisplayConfig)
//! naming the _identity keys_ whose slugs address a record, and, optionally,
//! the _title keys_ that label it. Every component agrees on these:
//!
//!   * [`walk`] enumerates a record's non-empty fields, leaving out identity,
//!     title, and reserved fields.
//!   * [`render`] turns a record into a [`Node`](render::Node) tree of
//!     headings, paragraphs, and lists, at any depth.
//!   * [`matcher`] tests records against field filters and word-prefix
//!     searches.
//!   * [`link`] builds identities and locators and finds records by them.
//!   * [`group`] groups records by category path and by event date.
//!   * [`selection`] remembers which records a visitor marked.
//!
//! [`display::ContentDisplay`] ties these together into views written into
//! the columns of a [`display::Page`].
)]

#[macro_use]
pub mod error;
pub mod util;
pub mod value;
pub mod walk;
pub mod link;
pub mod render;
pub mod matcher;
pub mod group;
pub mod selection;
pub mod config;
pub mod content;
pub mod display;

pub use content::{Collection, Site};
pub use display::{ContentDisplay, Page};
