//! Log stream channel.
//!
//! `state_machine` holds the pure reconnect logic, `controller` the task that
//! owns the socket and executes the machine's actions, and `classify` the
//! recognition of completion lines.

pub mod classify;
pub mod controller;
pub mod state_machine;

pub use classify::completed_pair;
pub use controller::{ChannelSnapshot, StreamChannel};
pub use state_machine::ChannelState;
