//! Store visit image jobs
//!
//! Accepts batches of store visits, validates each visit's store id against the
//! store master registry, downloads and measures every image concurrently, and
//! reports a pollable per-job status.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
