//! Host concentration analysis for short-term rental listings.
//!
//! Loads a tab-delimited listings export, cleans it into typed records and
//! derives the tables used to tell commercial operators from individual
//! hosts: listings per neighbourhood, listings per owner, owner
//! concentration, accommodation type mix and price per person.
pub mod aggregate;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod types;
pub mod util;

pub use error::{AnalysisError, Result};
