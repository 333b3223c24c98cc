//! data_runtime: ability content schemas, loaders, and server configuration.
//!
//! Content is immutable once loaded; the simulation only ever holds shared
//! references to it.

pub mod ids;
pub mod loader;
pub mod scenario;
pub mod specdb;
pub mod spell;
pub mod configs {
    pub mod server;
    pub mod telemetry;
}
