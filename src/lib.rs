//! Satellite state pipeline: catalog retrieval and caching, SGP4
//! propagation into a renderable frame, orbit path sampling and screen-space
//! label placement, served to external renderers over a small HTTP API.

pub mod app;
pub mod catalog;
pub mod categorize;
pub mod config;
pub mod projector;
pub mod propagate;
pub mod registry;
pub mod snapshot;
pub mod web;
