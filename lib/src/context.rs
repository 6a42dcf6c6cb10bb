//! Machine-wide state handed to balancing algorithms.
//!
//! CPUs do not point back at the machine that owns them. Instead the machine lends
//! its CPUs, its counters and the random source to a [`MachineContext`] for the
//! duration of one placement or one cycle.
use getset::CopyGetters;
use log::debug;
use rand::RngCore;
use serde_derive::{Deserialize, Serialize};

use crate::{algorithm::Algorithm, cpu::Cpu, process::Process};

/// Coordination overhead of a run. Both counters only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, CopyGetters, Serialize, Deserialize)]
#[getset(get_copy = "pub")]
pub struct BalancingCounters {
    usage_request_count: u64,
    relocation_count: u64,
}

impl BalancingCounters {
    pub fn increase_usage_request_count(&mut self) {
        self.usage_request_count += 1;
    }

    pub fn increase_relocation_count(&mut self, amount: u64) {
        self.relocation_count += amount;
    }
}

pub struct MachineContext<'a> {
    pub cpus: &'a mut [Cpu],
    pub counters: &'a mut BalancingCounters,
    pub rng: &'a mut dyn RngCore,
}

impl<'a> MachineContext<'a> {
    pub fn new(
        cpus: &'a mut [Cpu],
        counters: &'a mut BalancingCounters,
        rng: &'a mut dyn RngCore,
    ) -> Self {
        Self { cpus, counters, rng }
    }

    /// Ids of every CPU except `cpu_id`, in machine order.
    pub fn peer_ids(&self, cpu_id: usize) -> Vec<usize> {
        self.cpus
            .iter()
            .map(|cpu| cpu.id())
            .filter(|&id| id != cpu_id)
            .collect()
    }

    /// Offers `process` to `cpu_id` through the algorithm. A rejected process is handed back.
    pub fn send_process(
        &mut self,
        algorithm: &dyn Algorithm,
        cpu_id: usize,
        process: Process,
    ) -> Result<(), Process> {
        algorithm.handle_process(self, cpu_id, process)
    }

    /// Runs one cycle of `cpu_id`: accounting, burst, backfill through the algorithm
    /// and finally the algorithm's per-cycle step.
    pub fn make_cycle(&mut self, algorithm: &dyn Algorithm, cpu_id: usize) {
        if self.cpus[cpu_id].burst_processes() {
            while let Some(process) = self.cpus[cpu_id].pop_admissible() {
                if let Err(process) = algorithm.handle_process(self, cpu_id, process) {
                    debug!(
                        "{} rejected backfill of process {} on CPU {}",
                        algorithm.name(),
                        process.id(),
                        cpu_id
                    );
                    self.cpus[cpu_id].requeue_front(process);
                    break;
                }
            }
        }
        algorithm.step(self, cpu_id);
    }
}
