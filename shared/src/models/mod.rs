//! Domain models for the AgroGenius advisory platform

mod agronomic;
mod chat;
mod prediction;
mod resources;

pub use agronomic::*;
pub use chat::*;
pub use prediction::*;
pub use resources::*;
