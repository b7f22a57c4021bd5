pub mod candidates;
pub mod destination;
pub mod engine;
pub mod error;
pub mod io;
pub mod matcher;
pub mod model;
pub mod plan;

pub use error::{Result, SweepError};
