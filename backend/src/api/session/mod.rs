//! Module for the per-page session API.
//!
//! One session backs one open ordering page: it serves the filtered menu,
//! mutates the cart, streams cart changes, and places orders.

pub mod handlers;
pub mod routes;
