// Showdown lineup engine: weighted-random lineup generation under a salary
// window and portfolio-aware assignment of lineups to contest entries.

pub mod analysis;
pub mod assignment;
pub mod entry;
pub mod error;
pub mod generator;
pub mod lineup;
pub mod player;
pub mod portfolio;
pub mod sampling;
pub mod scorer;
pub mod session;

pub use error::EngineError;
