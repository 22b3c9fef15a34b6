//! HTTP API for student records backed by a single JSON file.
//!
//! Two operations are exposed: create a student and list all students. The
//! collection is stored as a pretty-printed JSON array; a file that cannot
//! be decoded is moved aside and replaced with an empty collection.
//!
//! ```text
//! GET  /               welcome text
//! POST /api/students   create, 201 + record
//! GET  /api/students   list in insertion order
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`student`]: Student record and request validation
//! - [`store`]: JSON file persistence with corruption recovery
//! - [`api`]: HTTP router and handlers
//! - [`metrics`]: Prometheus counters and latency histograms
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod store;
pub mod student;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
