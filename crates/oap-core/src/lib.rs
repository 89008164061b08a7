pub mod config;
pub mod error;
pub mod parse;
pub mod pipeline;
pub mod transform;

pub use pipeline::{PrepReport, Prepared, prepare, prepare_bytes};
