//! Random construction of per-CPU schedule queues.
use std::collections::VecDeque;

use rand::Rng;
use serde_derive::{Deserialize, Serialize};

use crate::{
    error::{Result, SimulationError},
    process::Process,
    schedule::Schedule,
    util::{check_range, sample_closed, sample_half_open},
};

/// Bounds for [`generate`]. Lengths, delays and burst times are drawn from
/// `[min, max)` (exactly `min` when both are equal), usages from `[min, max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorParams {
    pub cpu_count: usize,
    pub min_length: u32,
    pub max_length: u32,
    pub min_usage: f64,
    pub max_usage: f64,
    pub min_delay: u32,
    pub max_delay: u32,
    pub min_burst_time: u32,
    pub max_burst_time: u32,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            cpu_count: 50,
            min_length: 500,
            max_length: 1000,
            min_usage: 0.03,
            max_usage: 0.1,
            min_delay: 0,
            max_delay: 2,
            min_burst_time: 10,
            max_burst_time: 20,
        }
    }
}

impl GeneratorParams {
    pub fn validate(&self) -> Result<()> {
        check_range("length", self.min_length, self.max_length)?;
        check_range("usage", self.min_usage, self.max_usage)?;
        check_range("delay", self.min_delay, self.max_delay)?;
        check_range("burst time", self.min_burst_time, self.max_burst_time)?;
        for usage in [self.min_usage, self.max_usage] {
            if !(0.0..=1.0).contains(&usage) {
                return Err(SimulationError::InvalidUsage(usage));
            }
        }
        if self.min_burst_time == 0 {
            return Err(SimulationError::InvalidBurstTime(0));
        }
        Ok(())
    }
}

/// Generates one schedule queue per CPU. Process ids are unique across all queues
/// and increase in generation order.
pub fn generate(params: &GeneratorParams, rng: &mut impl Rng) -> Result<Vec<VecDeque<Schedule>>> {
    params.validate()?;

    let mut next_id = 0;
    let mut schedules = Vec::with_capacity(params.cpu_count);
    for _ in 0..params.cpu_count {
        let length = sample_half_open(rng, params.min_length, params.max_length);
        let mut queue = VecDeque::with_capacity(length as usize);
        for _ in 0..length {
            let usage = sample_closed(rng, params.min_usage, params.max_usage);
            let delay = sample_half_open(rng, params.min_delay, params.max_delay);
            let burst_time = sample_half_open(rng, params.min_burst_time, params.max_burst_time);
            queue.push_back(Schedule::new(Process::new(next_id, usage, burst_time)?, delay));
            next_id += 1;
        }
        schedules.push(queue);
    }
    Ok(schedules)
}
