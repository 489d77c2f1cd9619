//! Background jobs

pub mod cycle_reset;

pub use cycle_reset::CycleResetJob;
