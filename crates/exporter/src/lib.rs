//! Docker status exporter server
//!
//! Configuration, logging setup and the `/metrics` HTTP endpoint around
//! the scrape pipeline in `docker_status_lib`.

pub mod api;
pub mod config;
pub mod logging;
