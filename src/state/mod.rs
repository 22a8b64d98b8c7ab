//! Form state module

pub mod forms;
mod path;
mod snapshot;

pub use forms::*;
pub use path::*;
pub use snapshot::*;
