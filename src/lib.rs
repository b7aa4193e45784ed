pub mod args;
pub mod bounded;
pub mod flowlog;
pub mod serde;
pub mod tuple;
pub mod update;

mod error;

pub use error::Error;
