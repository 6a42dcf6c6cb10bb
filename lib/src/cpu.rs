//! This module contains the definition of a single processing unit: its admission control,
//! running set and FIFO ready queue.
use std::collections::{HashSet, VecDeque};
use std::hash::{Hash, Hasher};

use getset::CopyGetters;
use rand::{seq::SliceRandom, Rng};

use crate::process::{ExecutionResult, Process};

#[derive(Debug, Clone, CopyGetters)]
pub struct Cpu {
    #[getset(get_copy = "pub")]
    id: usize,
    running: Vec<Process>,
    waiting: VecDeque<Process>,
    total_usage: f64,
    #[getset(get_copy = "pub")]
    cycle_count: u64,
}

impl Cpu {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            running: Vec::new(),
            waiting: VecDeque::new(),
            total_usage: 0.0,
            cycle_count: 0,
        }
    }

    fn fits(&self, process: &Process) -> bool {
        self.usage() + process.usage() <= 1.0
    }

    /// Runs the process if there is enough capacity left, queues it otherwise.
    pub fn add_process(&mut self, process: Process) {
        if self.fits(&process) {
            self.running.push(process);
        } else {
            self.waiting.push_back(process);
        }
    }

    pub fn add_processes(&mut self, processes: impl IntoIterator<Item = Process>) {
        for process in processes {
            self.add_process(process);
        }
    }

    /// Sum of the usage of the running processes. Waiting processes do not count.
    pub fn usage(&self) -> f64 {
        self.running.iter().map(|process| process.usage()).sum()
    }

    /// Lifetime usage divided by the number of cycles, `None` before the first cycle.
    pub fn average_usage(&self) -> Option<f64> {
        if self.cycle_count == 0 {
            return None;
        }
        Some(self.total_usage / self.cycle_count as f64)
    }

    pub fn running_processes(&self) -> &[Process] {
        &self.running
    }

    pub fn waiting_processes(&self) -> &VecDeque<Process> {
        &self.waiting
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_empty() && self.waiting.is_empty()
    }

    /// Accounts this cycle's usage and executes every running process once.
    ///
    /// Returns whether any process finished and freed capacity.
    pub fn burst_processes(&mut self) -> bool {
        self.cycle_count += 1;
        self.total_usage += self.usage();

        let before = self.running.len();
        self.running
            .retain_mut(|process| process.execute() == ExecutionResult::Continue);
        self.running.len() != before
    }

    /// Pops the head of the ready queue if it fits into the remaining capacity.
    pub fn pop_admissible(&mut self) -> Option<Process> {
        match self.waiting.front() {
            Some(head) if self.fits(head) => self.waiting.pop_front(),
            _ => None,
        }
    }

    /// Moves processes from the head of the ready queue into the running set while they fit.
    pub fn admit_waiting(&mut self) {
        while let Some(process) = self.pop_admissible() {
            self.running.push(process);
        }
    }

    /// Puts a process back at the head of the ready queue.
    pub fn requeue_front(&mut self, process: Process) {
        self.waiting.push_front(process);
    }

    /// Removes a uniformly random `floor(fraction * n)` of the `n` running and
    /// waiting processes and returns exactly the removed ones, running ones first.
    pub fn get_process_portion(&mut self, fraction: f64, rng: &mut impl Rng) -> Vec<Process> {
        let total = self.running.len() + self.waiting.len();
        let amount = ((total as f64) * fraction.clamp(0.0, 1.0)).floor() as usize;
        if amount == 0 {
            return Vec::new();
        }

        let picked: HashSet<usize> = rand::seq::index::sample(rng, total, amount)
            .into_iter()
            .collect();
        let mut portion = Vec::with_capacity(amount);
        let mut index = 0;

        let mut kept_running = Vec::with_capacity(self.running.len());
        for process in self.running.drain(..) {
            if picked.contains(&index) {
                portion.push(process);
            } else {
                kept_running.push(process);
            }
            index += 1;
        }
        self.running = kept_running;

        let mut kept_waiting = VecDeque::with_capacity(self.waiting.len());
        for process in self.waiting.drain(..) {
            if picked.contains(&index) {
                portion.push(process);
            } else {
                kept_waiting.push_back(process);
            }
            index += 1;
        }
        self.waiting = kept_waiting;

        portion
    }

    /// Picks a uniformly random CPU id out of `candidates`.
    pub fn random_cpu(candidates: &[usize], rng: &mut impl Rng) -> Option<usize> {
        candidates.choose(rng).copied()
    }
}

impl PartialEq for Cpu {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Cpu {}

impl Hash for Cpu {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
