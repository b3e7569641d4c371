//! Raw device state tracking for the publish loop.
//!
//! Exactly one writer exists: the loop feeds each polled event into the
//! [`StateAccumulator`], then hands the per-cycle [`EventOutcome`] to the
//! [`OutputMode`] toggle. Both are plain values owned by the loop, so there
//! is no shared state and nothing to lock.

pub mod accumulator;
pub mod mode;

pub use accumulator::{EventOutcome, StateAccumulator, IDLE_ZERO_CYCLES};
pub use mode::{OutputMode, MODE_TOGGLE_BUTTON};
