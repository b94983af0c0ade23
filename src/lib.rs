pub mod config;
pub mod cooccur;
pub mod driver;
pub mod emit;
pub mod error;
pub mod input;
pub mod logging;
pub mod mapreduce;
pub mod numeric;
pub mod rank;
