//! Terminal viewer for a remote product catalog.
//!
//! Products are fetched from a JSON endpoint and shown as a filterable,
//! sortable and paginated table. The view stages in [`view`] are plain
//! functions over row index vectors, [`engine::TableEngine`] chains them and
//! the [`model`], [`controller`] and [`ui`] modules put a terminal on top.

pub mod column;
pub mod controller;
pub mod domain;
pub mod engine;
pub mod export;
pub mod fetcher;
pub mod inputter;
pub mod logging;
pub mod model;
pub mod record;
pub mod source;
pub mod ui;
pub mod view;
