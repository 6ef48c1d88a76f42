pub mod countdown;

pub use countdown::{ClockEvent, ClockState, CountdownClock, TickOutcome};
