//! Error types and result aliases for Quarry.
//!
//! Every crate in the workspace reports failures through [`QuarryError`].

mod error;

pub use error::{GenericError, QuarryError, QuarryResult};
