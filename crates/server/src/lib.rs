//! HTTP surface of the filmzi channel file catalog.

pub mod api;
pub mod metrics;
pub mod state;
