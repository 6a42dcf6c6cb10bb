use serde_derive::{Deserialize, Serialize};
use std::io;

use crate::{cpu::Cpu, machine::Machine, output_log::append_info_to_yaml};

#[derive(Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
pub struct CpuLog {
    pub cpu_id: usize,
    pub cycle_count: u64,
    pub average_usage: f64,
}

impl CpuLog {
    pub fn new(cpu: &Cpu) -> Self {
        Self {
            cpu_id: cpu.id(),
            cycle_count: cpu.cycle_count(),
            average_usage: cpu.average_usage().unwrap_or_default(),
        }
    }
}

#[derive(Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
pub struct MachineLog {
    pub algorithm: String,
    pub number_of_cpus: usize,
    pub cycle_count: u64,
    pub average_usage: f64,
    pub average_usage_deviation: f64,
    pub usage_request_count: u64,
    pub relocation_count: u64,
    pub duration_millis: i64,
    pub cpu_logs: Vec<CpuLog>,
}

impl MachineLog {
    pub fn new(machine: &Machine) -> Self {
        Self {
            algorithm: machine.algorithm().name().to_owned(),
            number_of_cpus: machine.cpus().len(),
            cycle_count: machine.cycle_count(),
            average_usage: machine.average_usage().unwrap_or_default(),
            average_usage_deviation: machine.average_usage_deviation().unwrap_or_default(),
            usage_request_count: machine.usage_request_count(),
            relocation_count: machine.relocation_count(),
            duration_millis: machine
                .duration()
                .map(|duration| duration.num_milliseconds())
                .unwrap_or_default(),
            cpu_logs: machine.cpus().iter().map(CpuLog::new).collect(),
        }
    }
}

#[derive(Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
pub struct MachineLogs {
    pub machine_logs: Vec<MachineLog>,
}

/// Appends the logs of one comparison (one entry per algorithm) under a `machine_logs` key.
pub fn dump_machine_logs_to_yaml(file_path: &str, machine_logs: &[MachineLog]) -> io::Result<()> {
    let machine_logs = MachineLogs {
        machine_logs: machine_logs.to_vec(),
    };
    let yaml =
        serde_yaml::to_string(&machine_logs).expect("Failed to serialize MachineLogs to YAML");
    append_info_to_yaml(file_path, &yaml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{algorithm::Local, process::Process, schedule::Schedule};
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::VecDeque;

    fn create_machine() -> Machine {
        let schedules = vec![
            VecDeque::from(vec![Schedule::new(Process::new(0, 0.5, 2).unwrap(), 0)]),
            VecDeque::new(),
        ];
        Machine::new(2, Box::new(Local), &schedules).unwrap()
    }

    #[test]
    fn test_machine_log_new() {
        let mut machine = create_machine();
        machine.run(&mut StdRng::seed_from_u64(0));
        let log = MachineLog::new(&machine);

        assert_eq!(log.algorithm, "Algorithm #1");
        assert_eq!(log.number_of_cpus, 2);
        assert_eq!(log.cycle_count, 1);
        assert_eq!(log.average_usage, 0.25);
        assert_eq!(log.average_usage_deviation, 0.25);
        assert_eq!(log.usage_request_count, 0);
        assert_eq!(log.cpu_logs.len(), 2);
        assert_eq!(
            log.cpu_logs[0],
            CpuLog {
                cpu_id: 0,
                cycle_count: 1,
                average_usage: 0.5
            }
        );
    }

    #[test]
    fn test_machine_log_before_run() {
        let log = MachineLog::new(&create_machine());
        assert_eq!(log.average_usage, 0.0);
        assert_eq!(log.duration_millis, 0);
    }

    #[test]
    fn test_dump_machine_logs_to_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("machine.yaml");
        let file_path = file_path.to_str().unwrap();

        let mut machine = create_machine();
        machine.run(&mut StdRng::seed_from_u64(0));
        let log = MachineLog::new(&machine);
        dump_machine_logs_to_yaml(file_path, &[log.clone(), MachineLog::default()]).unwrap();

        let file_contents = std::fs::read_to_string(file_path).unwrap();
        let read_back: MachineLogs = serde_yaml::from_str(&file_contents).unwrap();
        assert_eq!(read_back.machine_logs, vec![log, MachineLog::default()]);
    }
}
