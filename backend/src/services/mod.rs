//! Module for core business logic services.
//!
//! This module encapsulates the ordering page's state machine: the catalog
//! and its category index, the selection cart, the view projector, the order
//! submitter, and the sessions that tie them to one open page.

pub mod cart;
pub mod catalog;
pub mod category_index;
pub mod filter;
pub mod notice;
pub mod order_submitter;
pub mod presenter;
pub mod session;
pub mod table;
