//! Release of scheduled processes to CPUs, cycle by cycle.
use std::collections::VecDeque;

use crate::{
    error::{Result, SimulationError},
    process::Process,
    schedule::Schedule,
};

/// Holds one schedule queue per CPU and a single timer shared by all of them.
///
/// The timer is global on purpose: a release from any queue resets it, so every
/// other queue measures its next delay from that release as well. Observable results
/// depend on this coupling.
#[derive(Debug, Clone)]
pub struct Scheduler {
    assigned_schedules: Vec<VecDeque<Schedule>>,
    timer: u32,
}

impl Scheduler {
    /// Copies `schedules` and assigns the i-th queue to CPU i.
    pub fn new(cpu_count: usize, schedules: &[VecDeque<Schedule>]) -> Result<Self> {
        if schedules.len() != cpu_count {
            return Err(SimulationError::ScheduleCountMismatch {
                cpus: cpu_count,
                schedules: schedules.len(),
            });
        }
        Ok(Self {
            assigned_schedules: schedules.to_vec(),
            timer: 0,
        })
    }

    pub fn timer(&self) -> u32 {
        self.timer
    }

    /// Processes released this cycle, indexed by CPU id.
    ///
    /// A queue releases its head when the head's delay equals the timer, followed by
    /// every directly following schedule with a delay of zero.
    pub fn get_processes(&mut self) -> Vec<Vec<Process>> {
        let timer = self.timer;
        let mut reset_timer = false;
        let released: Vec<Vec<Process>> = self
            .assigned_schedules
            .iter_mut()
            .map(|queue| {
                let mut processes = Vec::new();
                if queue.front().map(|head| head.delay()) == Some(timer) {
                    reset_timer = true;
                    while let Some(schedule) = queue.pop_front() {
                        processes.push(schedule.into_process());
                        if queue.front().map(|head| head.delay()) != Some(0) {
                            break;
                        }
                    }
                }
                processes
            })
            .collect();
        self.timer = if reset_timer { 0 } else { self.timer + 1 };
        released
    }

    pub fn is_done(&self) -> bool {
        self.assigned_schedules.iter().all(|queue| queue.is_empty())
    }
}
