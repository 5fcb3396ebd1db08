//! Chart sessions and their owner.
//!
//! - `chart`: one chart per selected pair, fed by three independent fetches.
//! - `selection`: the ordered, persisted set of selected pairs.
//! - `resize`: trailing debounce for viewport resizes.
//! - `manager`: the `SessionManager` that ties them together.
//! - `driver`: runs a `SessionManager` on its own task behind a command channel.

pub mod chart;
pub mod driver;
pub mod manager;
pub mod resize;
pub mod selection;
