//! Storefront domain logic shared by the database, events and API crates.
//!
//! Nothing in here talks to PostgreSQL or the network:
//!
//! - [`variants`]: option placeholders, the cartesian expander and the
//!   product template materializer.
//! - [`images`]: image decoding, thumbnailing and the [`images::ImageStorer`]
//!   backends.
//! - [`validation`] and [`pagination`]: request-level rules.
//! - [`error`]: the [`CoreError`](error::CoreError) used across crates.

pub mod error;
pub mod event_types;
pub mod images;
pub mod pagination;
pub mod types;
pub mod validation;
pub mod variants;
