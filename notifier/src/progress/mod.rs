//! Progress rendering into a single chat message

pub mod bar;
pub mod channel;

pub use channel::{ChannelOptions, ProgressChannel};
