//! Command line front end for fuzzy decision areas.
//!
//! The binary evaluates, checks and charts areas stored as JSON files. The
//! pieces it is built from live here so they can be tested without a
//! process boundary.

pub mod commands;
pub mod config;
pub mod headless;
pub mod persist;

pub use config::CliConfig;
pub use persist::{list_areas, load_area, save_area, AreaDocument, AreaInfo, PersistError};
