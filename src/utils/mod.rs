pub mod math;
pub mod clock;
pub mod history;
