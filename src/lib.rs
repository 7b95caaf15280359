//! Builds a complete GTFS feed from a compact, frequency-based description
//! of a transit network: route frequencies, service windows, and path
//! geometries in; expanded trips and stop times out.

pub mod build;
pub mod feed;
pub mod geometry;
pub mod plan;
pub mod prelude;
pub mod shared;
