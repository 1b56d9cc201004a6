#![cfg_attr(not(feature = "std"), no_std)]
extern crate alloc;

pub mod utils;

pub mod controllers;

#[cfg(feature = "std")]
pub mod logger;

pub use controllers::{
    pid::{ControlMode, PIDGains, PIDSettings, PIDTerms, SecondTermGain, PID},
    FeedbackController,
};
pub use utils::clock::{Clock, ManualClock};

#[cfg(feature = "std")]
pub use utils::clock::MonotonicClock;
