pub mod algorithm;
pub mod context;
pub mod cpu;
pub mod error;
pub mod generator;
pub mod log;
pub mod machine;
pub mod output_log;
pub mod process;
pub mod schedule;
pub mod scheduler;
pub mod util;
