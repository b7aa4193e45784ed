pub mod secs;
