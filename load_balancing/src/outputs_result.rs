use std::{collections::BTreeMap, io};

use lib::{
    algorithm::BalancingParams, generator::GeneratorParams, log::MachineLog,
    output_log::append_info_to_yaml, util::truncate_percent,
};
use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
struct RunInfo {
    seed: u64,
    generator_params: GeneratorParams,
    balancing_params: BalancingParams,
}

pub fn dump_run_info_to_yaml(
    file_path: &str,
    seed: u64,
    generator_params: &GeneratorParams,
    balancing_params: &BalancingParams,
) -> io::Result<()> {
    let run_info = RunInfo {
        seed,
        generator_params: generator_params.clone(),
        balancing_params: *balancing_params,
    };
    let yaml = serde_yaml::to_string(&run_info).expect("Failed to serialize RunInfo to YAML");
    append_info_to_yaml(file_path, &yaml)
}

/// One CPU count of a sweep, one value per algorithm name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepCategory<T> {
    pub category: usize,
    pub results: BTreeMap<String, T>,
}

impl<T> SweepCategory<T> {
    fn new(category: usize, logs: &[MachineLog], value: impl Fn(&MachineLog) -> T) -> Self {
        Self {
            category,
            results: logs
                .iter()
                .map(|log| (log.algorithm.clone(), value(log)))
                .collect(),
        }
    }
}

/// Metrics of a sweep over CPU counts. Usages are percentages truncated to two decimals.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub average_usages: Vec<SweepCategory<f64>>,
    pub average_usage_deviations: Vec<SweepCategory<f64>>,
    pub usage_request_counts: Vec<SweepCategory<u64>>,
    pub relocation_counts: Vec<SweepCategory<u64>>,
    pub durations: Vec<SweepCategory<i64>>,
}

impl SweepResult {
    pub fn push_category(&mut self, cpu_count: usize, logs: &[MachineLog]) {
        self.average_usages.push(SweepCategory::new(cpu_count, logs, |log| {
            truncate_percent(log.average_usage)
        }));
        self.average_usage_deviations
            .push(SweepCategory::new(cpu_count, logs, |log| {
                truncate_percent(log.average_usage_deviation)
            }));
        self.usage_request_counts
            .push(SweepCategory::new(cpu_count, logs, |log| {
                log.usage_request_count
            }));
        self.relocation_counts
            .push(SweepCategory::new(cpu_count, logs, |log| log.relocation_count));
        self.durations
            .push(SweepCategory::new(cpu_count, logs, |log| log.duration_millis));
    }

    pub fn dump_sweep_result_to_yaml(&self, file_path: &str) -> io::Result<()> {
        let yaml = serde_yaml::to_string(&self).expect("Failed to serialize SweepResult to YAML");
        append_info_to_yaml(file_path, &yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib::output_log::create_yaml_file;

    fn create_machine_log(algorithm: &str, average_usage: f64, relocation_count: u64) -> MachineLog {
        MachineLog {
            algorithm: algorithm.to_owned(),
            number_of_cpus: 2,
            average_usage,
            relocation_count,
            ..Default::default()
        }
    }

    #[test]
    fn test_push_category_keys_by_algorithm() {
        let logs = vec![
            create_machine_log("Algorithm #1", 0.5, 0),
            create_machine_log("Algorithm #2", 0.25, 7),
        ];
        let mut sweep = SweepResult::default();
        sweep.push_category(10, &logs);

        assert_eq!(sweep.average_usages.len(), 1);
        assert_eq!(sweep.average_usages[0].category, 10);
        assert_eq!(sweep.average_usages[0].results["Algorithm #1"], 50.0);
        assert_eq!(sweep.average_usages[0].results["Algorithm #2"], 25.0);
        assert_eq!(sweep.relocation_counts[0].results["Algorithm #2"], 7);
        assert_eq!(sweep.durations[0].results.len(), 2);
    }

    #[test]
    fn test_dump_sweep_result_to_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = create_yaml_file(dir.path().to_str().unwrap(), "sweep").unwrap();
        let mut sweep = SweepResult::default();
        sweep.push_category(10, &[create_machine_log("Algorithm #1", 0.5, 0)]);
        sweep.push_category(20, &[create_machine_log("Algorithm #1", 0.75, 0)]);
        sweep.dump_sweep_result_to_yaml(&file_path).unwrap();

        let file_contents = std::fs::read_to_string(&file_path).unwrap();
        let read_back: SweepResult = serde_yaml::from_str(&file_contents).unwrap();
        assert_eq!(read_back, sweep);
    }

    #[test]
    fn test_dump_run_info_to_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = create_yaml_file(dir.path().to_str().unwrap(), "run").unwrap();
        dump_run_info_to_yaml(
            &file_path,
            42,
            &GeneratorParams::default(),
            &BalancingParams::default(),
        )
        .unwrap();

        let file_contents = std::fs::read_to_string(&file_path).unwrap();
        let run_info: RunInfo = serde_yaml::from_str(&file_contents).unwrap();
        assert_eq!(run_info.seed, 42);
        assert_eq!(run_info.generator_params, GeneratorParams::default());
        assert_eq!(run_info.balancing_params, BalancingParams::default());
    }
}
