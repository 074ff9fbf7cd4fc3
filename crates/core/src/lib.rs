//! Vitrine Core - catalog, filter and cart state engine.
//!
//! This crate holds the client-side state of a storefront session:
//! - [`catalog`] - de-duplicated, append-only product list with its load state machine
//! - [`category`] - category reference data and the current selection
//! - [`selection`] - multi-select category filter, derived on every read
//! - [`cart`] - cart aggregate with quantity-merge semantics
//! - [`scroll`] - infinite-scroll trigger decision
//! - [`source`] - the fetch seam (`CatalogSource`) and `FetchError`
//!
//! # Architecture
//!
//! The core crate contains only types, state machines and traits - no I/O,
//! no HTTP clients. Fetching is delegated to a [`source::CatalogSource`]
//! implementation supplied by the caller.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod category;
pub mod scroll;
pub mod selection;
pub mod source;
pub mod types;

#[cfg(test)]
mod fixtures;

pub use cart::{Cart, CartLine, CartSummary};
pub use catalog::{Catalog, LoadState, MergeStats, PageResult, PageSummary, SkipReason};
pub use category::{CategoryDirectory, CategoryState};
pub use scroll::{ScrollTrigger, Viewport};
pub use selection::{Selection, filter, matches_search};
pub use source::{CatalogSource, FetchError, Page, PageCursor};
pub use types::*;
