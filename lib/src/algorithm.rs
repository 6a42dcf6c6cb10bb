//! Load-balancing strategies consulted whenever a process has to be placed on a CPU.
use std::fmt;

use log::debug;
use rand::Rng;
use serde_derive::{Deserialize, Serialize};

use crate::{
    context::MachineContext,
    cpu::Cpu,
    error::{Result, SimulationError},
    process::Process,
};

pub trait Algorithm {
    fn name(&self) -> &str;

    /// Places `process`, offered to `cpu_id`, somewhere in the machine.
    ///
    /// Hands the process back when it could not be placed. By default the process
    /// lands on the offering CPU, whose admission control decides between running
    /// it and queueing it.
    fn handle_process(
        &self,
        ctx: &mut MachineContext<'_>,
        cpu_id: usize,
        process: Process,
    ) -> std::result::Result<(), Process> {
        ctx.cpus[cpu_id].add_process(process);
        Ok(())
    }

    /// Called once per cycle for every CPU after it executed its processes.
    fn step(&self, _ctx: &mut MachineContext<'_>, _cpu_id: usize) {}
}

fn check_fraction(value: f64, error: fn(f64) -> SimulationError) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(error(value))
    }
}

/// Algorithm #1: every process stays on the CPU it appeared on.
#[derive(Debug, Clone, Copy, Default)]
pub struct Local;

impl Algorithm for Local {
    fn name(&self) -> &str {
        "Algorithm #1"
    }
}

/// Algorithm #2: the CPU a process appears on asks randomly chosen peers, each at most
/// once, for their usage. The first peer below the threshold takes the process. If
/// none does, the process stays local.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdProbe {
    threshold: f64,
}

impl ThresholdProbe {
    pub fn new(threshold: f64) -> Result<Self> {
        Ok(Self {
            threshold: check_fraction(threshold, SimulationError::InvalidThreshold)?,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    fn probe(&self, ctx: &mut MachineContext<'_>, cpu_id: usize, process: Process) {
        let mut candidates = ctx.peer_ids(cpu_id);
        while !candidates.is_empty() {
            let peer_id = candidates.swap_remove(ctx.rng.gen_range(0..candidates.len()));
            ctx.counters.increase_usage_request_count();
            if ctx.cpus[peer_id].usage() < self.threshold {
                debug!(
                    "Relocating process {} from CPU {} to CPU {}",
                    process.id(),
                    cpu_id,
                    peer_id
                );
                ctx.counters.increase_relocation_count(1);
                ctx.cpus[peer_id].add_process(process);
                return;
            }
        }
        ctx.cpus[cpu_id].add_process(process);
    }
}

impl Algorithm for ThresholdProbe {
    fn name(&self) -> &str {
        "Algorithm #2"
    }

    fn handle_process(
        &self,
        ctx: &mut MachineContext<'_>,
        cpu_id: usize,
        process: Process,
    ) -> std::result::Result<(), Process> {
        self.probe(ctx, cpu_id, process);
        Ok(())
    }
}

/// Algorithm #3: placement as in [`ThresholdProbe`] with the upper threshold.
/// Additionally, every cycle a CPU whose usage is below the lower threshold asks one
/// random peer for its usage and, if it exceeds the upper threshold, takes a portion
/// of the peer's running and waiting processes.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdProbeWithStealing {
    placement: ThresholdProbe,
    lower_threshold: f64,
    portion: f64,
}

impl ThresholdProbeWithStealing {
    pub fn new(upper_threshold: f64, lower_threshold: f64, portion: f64) -> Result<Self> {
        Ok(Self {
            placement: ThresholdProbe::new(upper_threshold)?,
            lower_threshold: check_fraction(lower_threshold, SimulationError::InvalidThreshold)?,
            portion: check_fraction(portion, SimulationError::InvalidPortion)?,
        })
    }

    pub fn upper_threshold(&self) -> f64 {
        self.placement.threshold()
    }

    pub fn lower_threshold(&self) -> f64 {
        self.lower_threshold
    }

    pub fn portion(&self) -> f64 {
        self.portion
    }
}

impl Algorithm for ThresholdProbeWithStealing {
    fn name(&self) -> &str {
        "Algorithm #3"
    }

    fn handle_process(
        &self,
        ctx: &mut MachineContext<'_>,
        cpu_id: usize,
        process: Process,
    ) -> std::result::Result<(), Process> {
        self.placement.handle_process(ctx, cpu_id, process)
    }

    fn step(&self, ctx: &mut MachineContext<'_>, cpu_id: usize) {
        if ctx.cpus[cpu_id].usage() >= self.lower_threshold {
            return;
        }
        let peers = ctx.peer_ids(cpu_id);
        let Some(peer_id) = Cpu::random_cpu(&peers, &mut ctx.rng) else {
            return;
        };
        ctx.counters.increase_usage_request_count();
        if ctx.cpus[peer_id].usage() <= self.upper_threshold() {
            return;
        }

        let stolen = ctx.cpus[peer_id].get_process_portion(self.portion, &mut ctx.rng);
        if stolen.is_empty() {
            return;
        }
        debug!(
            "CPU {} took {} processes from CPU {}",
            cpu_id,
            stolen.len(),
            peer_id
        );
        ctx.counters.increase_relocation_count(stolen.len() as u64);
        ctx.cpus[cpu_id].add_processes(stolen);
        // The peer may have lost running processes without any of them finishing.
        ctx.cpus[peer_id].admit_waiting();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlgorithmKind {
    Local,
    ThresholdProbe,
    ThresholdProbeWithStealing,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 3] = [
        AlgorithmKind::Local,
        AlgorithmKind::ThresholdProbe,
        AlgorithmKind::ThresholdProbeWithStealing,
    ];
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlgorithmKind::Local => "local",
            AlgorithmKind::ThresholdProbe => "threshold_probe",
            AlgorithmKind::ThresholdProbeWithStealing => "threshold_probe_with_stealing",
        };
        write!(f, "{}", name)
    }
}

/// Parameters shared by the probing strategies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalancingParams {
    pub upper_threshold: f64,
    pub lower_threshold: f64,
    pub portion: f64,
}

impl Default for BalancingParams {
    fn default() -> Self {
        Self {
            upper_threshold: 0.6,
            lower_threshold: 0.2,
            portion: 0.5,
        }
    }
}

pub fn create_algorithm(kind: AlgorithmKind, params: &BalancingParams) -> Result<Box<dyn Algorithm>> {
    Ok(match kind {
        AlgorithmKind::Local => Box::new(Local),
        AlgorithmKind::ThresholdProbe => Box::new(ThresholdProbe::new(params.upper_threshold)?),
        AlgorithmKind::ThresholdProbeWithStealing => Box::new(ThresholdProbeWithStealing::new(
            params.upper_threshold,
            params.lower_threshold,
            params.portion,
        )?),
    })
}
