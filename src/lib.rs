//! env-flatten library
//!
//! Turns nested JSON/YAML configuration documents into `KEY=VALUE` lines for
//! loading into a process environment.

pub mod cli;
pub mod config;
pub mod error;
pub mod flatten;
pub mod format;
pub mod node;

pub use error::{ErrorCode, FlattenError, FlattenResult};
pub use flatten::{
    FlattenOptions, FlattenedEntry, Flattener, NullPolicy, SequencePolicy, flatten,
    flatten_to_string,
};
pub use node::{ConfigNode, Scalar};
