//! psrquant - Picrosirius Red collagen quantification
//!
//! Batch tooling around `psr-core`: configuration, image discovery,
//! raster export and the results table.
//! This library exposes modules for integration testing.

pub mod assets;
pub mod error;
pub mod models;
pub mod services;
