//! A machine: a fixed set of CPUs fed by a scheduler and balanced by one algorithm.
use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use log::info;
use rand::RngCore;

use crate::{
    algorithm::Algorithm,
    context::{BalancingCounters, MachineContext},
    cpu::Cpu,
    error::{Result, SimulationError},
    process::Process,
    schedule::Schedule,
    scheduler::Scheduler,
};

pub struct Machine {
    cpus: Vec<Cpu>,
    scheduler: Scheduler,
    algorithm: Box<dyn Algorithm>,
    /// Released processes not yet accepted by their CPU's algorithm, per CPU.
    pending: Vec<VecDeque<Process>>,
    counters: BalancingCounters,
    cycle_count: u64,
    time_start: Option<DateTime<Utc>>,
    time_stop: Option<DateTime<Utc>>,
}

impl Machine {
    /// Creates `cpu_count` CPUs with ids `0..cpu_count`, CPU i being fed by `schedules[i]`.
    pub fn new(
        cpu_count: usize,
        algorithm: Box<dyn Algorithm>,
        schedules: &[VecDeque<Schedule>],
    ) -> Result<Self> {
        if cpu_count == 0 {
            return Err(SimulationError::InvalidCpuCount(cpu_count));
        }
        let scheduler = Scheduler::new(cpu_count, schedules)?;
        Ok(Self {
            cpus: (0..cpu_count).map(Cpu::new).collect(),
            scheduler,
            algorithm,
            pending: vec![VecDeque::new(); cpu_count],
            counters: BalancingCounters::default(),
            cycle_count: 0,
            time_start: None,
            time_stop: None,
        })
    }

    pub fn cpus(&self) -> &[Cpu] {
        &self.cpus
    }

    pub fn algorithm(&self) -> &dyn Algorithm {
        self.algorithm.as_ref()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn counters(&self) -> BalancingCounters {
        self.counters
    }

    pub fn usage_request_count(&self) -> u64 {
        self.counters.usage_request_count()
    }

    pub fn relocation_count(&self) -> u64 {
        self.counters.relocation_count()
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn pending_len(&self, cpu_id: usize) -> usize {
        self.pending[cpu_id].len()
    }

    /// True once every schedule was released and every released process was accepted.
    pub fn is_finished(&self) -> bool {
        self.scheduler.is_done() && self.pending.iter().all(|queue| queue.is_empty())
    }

    /// Runs one cycle: releases due processes, offers each CPU its pending processes in
    /// order until the algorithm rejects one, then advances the CPU by one cycle.
    pub fn step<R: RngCore>(&mut self, rng: &mut R) {
        let released = self.scheduler.get_processes();
        for (pending, processes) in self.pending.iter_mut().zip(released) {
            pending.extend(processes);
        }

        let algorithm = self.algorithm.as_ref();
        let mut ctx = MachineContext::new(&mut self.cpus, &mut self.counters, rng);
        for (cpu_id, pending) in self.pending.iter_mut().enumerate() {
            while let Some(process) = pending.pop_front() {
                if let Err(process) = ctx.send_process(algorithm, cpu_id, process) {
                    pending.push_front(process);
                    break;
                }
            }
            ctx.make_cycle(algorithm, cpu_id);
        }
        self.cycle_count += 1;
    }

    pub fn run<R: RngCore>(&mut self, rng: &mut R) {
        info!(
            "{}: running on {} CPUs",
            self.algorithm.name(),
            self.cpus.len()
        );
        self.time_start = Some(Utc::now());
        while !self.is_finished() {
            self.step(rng);
        }
        self.time_stop = Some(Utc::now());
        info!(
            "{}: finished after {} cycles",
            self.algorithm.name(),
            self.cycle_count
        );
    }

    /// Mean of the CPUs' lifetime average usages, `None` before the first cycle.
    pub fn average_usage(&self) -> Option<f64> {
        let total = self
            .cpus
            .iter()
            .map(|cpu| cpu.average_usage())
            .sum::<Option<f64>>()?;
        Some(total / self.cpus.len() as f64)
    }

    /// Mean absolute deviation of the CPUs' average usages from [`Machine::average_usage`].
    pub fn average_usage_deviation(&self) -> Option<f64> {
        let average_usage = self.average_usage()?;
        let deviation = self
            .cpus
            .iter()
            .map(|cpu| cpu.average_usage().map(|usage| (usage - average_usage).abs()))
            .sum::<Option<f64>>()?;
        Some(deviation / self.cpus.len() as f64)
    }

    /// Wall-clock time spent in [`Machine::run`], `None` until it returned.
    pub fn duration(&self) -> Option<Duration> {
        match (self.time_start, self.time_stop) {
            (Some(start), Some(stop)) => Some(stop - start),
            _ => None,
        }
    }
}
