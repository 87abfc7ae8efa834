// src/strategies/traits.rs
use crate::types::{Position, Signal, Snapshot};

/// A decision unit driven once per iteration.
///
/// `decide` must not perform I/O. Implementations may keep internal
/// counters, but their configuration is fixed at construction.
pub trait Strategy: Send {
    fn name(&self) -> &str;

    fn decide(&mut self, snapshot: &Snapshot, position: &Position) -> Signal;
}

pub type BoxedStrategy = Box<dyn Strategy>;
