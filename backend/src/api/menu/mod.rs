//! Module for the menu API.
//!
//! Session-independent endpoints: the category navigation, catalog reloads,
//! and the placeholder image used by cards without a picture.

pub mod handlers;
pub mod routes;
