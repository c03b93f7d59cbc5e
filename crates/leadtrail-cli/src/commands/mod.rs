// Command handlers

pub mod config;
pub mod emit;
pub mod funnels;

pub use config::{ConfigAction, ConfigCommand};
pub use emit::{parse_property, EmitCommand};
pub use funnels::{FunnelSource, FunnelsAction, FunnelsCommand};
