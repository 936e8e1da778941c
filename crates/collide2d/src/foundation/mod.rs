//! Foundation utilities: math, logging, and timing

pub mod logging;
pub mod math;
pub mod time;
