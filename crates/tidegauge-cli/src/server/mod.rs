//! JSON API server for dashboard front ends.

pub mod app;
pub mod error;
pub mod handlers;
pub mod state;
