/// Bounded insertion-ordered set with oldest-first eviction
pub mod bounded_set;
pub mod config;
/// Shared constants
pub mod core;
/// Controller state tracking, persistence and signals
pub mod controller;
mod tests;

pub use bounded_set::{BoundedOrderedSet, BoundedSetError};
pub use controller::{
    controller_persist::{ControllerPersist, EvictionStats},
    persist::PersistError,
    restart::RestartSignal,
};
pub use crate::core::limits;
