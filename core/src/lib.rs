//! Access management for a residential complex: apartments, residents, gates and the
//! per-resident gate permissions, read from and written to a hosted record store.

pub mod access;
pub mod config;
mod dashboard;
mod error;
pub mod models;
pub mod permissions;
pub mod session;
pub mod store;
pub mod views;

pub use cg_store_api as store_api;
pub use dashboard::Dashboard;
pub use error::Error;
