mod outputs_result;

use anyhow::{ensure, Result};
use clap::Parser;
use lib::{
    algorithm::{create_algorithm, AlgorithmKind, BalancingParams},
    generator::{generate, GeneratorParams},
    log::{dump_machine_logs_to_yaml, MachineLog},
    machine::Machine,
    output_log::create_scheduler_log_yaml_file,
    util::format_percent,
};
use log::{error, info};
use outputs_result::{dump_run_info_to_yaml, SweepResult};
use rand::{rngs::StdRng, Rng, SeedableRng};

#[derive(Parser)]
#[clap(
    name = "load_balancing",
    version = "1.0",
    about = "About:
    Generates one schedule queue per CPU and runs it on a machine once per
    load-balancing algorithm, reporting average usage, usage deviation,
    usage request count and relocation count of each algorithm."
)]
struct ArgParser {
    ///Number of CPUs.
    #[clap(short = 'c', long = "number_of_cpus", default_value_t = 50)]
    number_of_cpus: usize,
    ///Usage below which a probed CPU accepts a relocated process.
    #[clap(short = 'p', long = "upper_threshold", default_value_t = 0.6)]
    upper_threshold: f64,
    ///Usage below which a CPU takes processes from a busy peer.
    #[clap(short = 'r', long = "lower_threshold", default_value_t = 0.2)]
    lower_threshold: f64,
    ///Portion of a busy peer's processes taken at once.
    #[clap(long = "portion", default_value_t = 0.5)]
    portion: f64,
    #[clap(long = "min_length", default_value_t = 500)]
    min_length: u32,
    #[clap(long = "max_length", default_value_t = 1000)]
    max_length: u32,
    #[clap(long = "min_usage", default_value_t = 0.03)]
    min_usage: f64,
    #[clap(long = "max_usage", default_value_t = 0.1)]
    max_usage: f64,
    #[clap(long = "min_delay", default_value_t = 0)]
    min_delay: u32,
    #[clap(long = "max_delay", default_value_t = 2)]
    max_delay: u32,
    #[clap(long = "min_burst_time", default_value_t = 10)]
    min_burst_time: u32,
    #[clap(long = "max_burst_time", default_value_t = 20)]
    max_burst_time: u32,
    ///Seed of the random source. A random seed is drawn and logged when omitted.
    #[clap(short = 's', long = "seed")]
    seed: Option<u64>,
    ///Run a sweep over CPU counts instead of a single comparison.
    #[clap(long = "sweep")]
    sweep: bool,
    #[clap(long = "sweep_start", default_value_t = 10)]
    sweep_start: usize,
    #[clap(long = "sweep_end", default_value_t = 100)]
    sweep_end: usize,
    #[clap(long = "sweep_interval", default_value_t = 10)]
    sweep_interval: usize,
    ///Path to output directory.
    #[clap(short = 'o', long = "output_dir_path", default_value = "../outputs")]
    output_dir_path: String,
}

impl ArgParser {
    fn generator_params(&self, cpu_count: usize) -> GeneratorParams {
        GeneratorParams {
            cpu_count,
            min_length: self.min_length,
            max_length: self.max_length,
            min_usage: self.min_usage,
            max_usage: self.max_usage,
            min_delay: self.min_delay,
            max_delay: self.max_delay,
            min_burst_time: self.min_burst_time,
            max_burst_time: self.max_burst_time,
        }
    }

    fn balancing_params(&self) -> BalancingParams {
        BalancingParams {
            upper_threshold: self.upper_threshold,
            lower_threshold: self.lower_threshold,
            portion: self.portion,
        }
    }
}

/// Runs the same generated workload once per algorithm.
fn run_comparison(
    generator_params: &GeneratorParams,
    balancing_params: &BalancingParams,
    rng: &mut impl Rng,
) -> Result<Vec<MachineLog>> {
    let schedules = generate(generator_params, rng)?;
    let mut machine_logs = Vec::with_capacity(AlgorithmKind::ALL.len());
    for kind in AlgorithmKind::ALL {
        let algorithm = create_algorithm(kind, balancing_params)?;
        let mut machine = Machine::new(generator_params.cpu_count, algorithm, &schedules)?;
        machine.run(rng);

        let machine_log = MachineLog::new(&machine);
        info!("{}:", machine_log.algorithm);
        info!("\tAverage usage: {}", format_percent(machine_log.average_usage));
        info!(
            "\tAverage usage deviation: {}",
            format_percent(machine_log.average_usage_deviation)
        );
        info!("\tUsage request count: {}", machine_log.usage_request_count);
        info!("\tRelocation count: {}", machine_log.relocation_count);
        info!("\tDuration (millis): {}", machine_log.duration_millis);
        machine_logs.push(machine_log);
    }
    Ok(machine_logs)
}

fn run_sweep(arg: &ArgParser, rng: &mut impl Rng) -> Result<SweepResult> {
    ensure!(arg.sweep_interval > 0, "sweep interval must be positive");
    let balancing_params = arg.balancing_params();
    let mut sweep_result = SweepResult::default();
    for cpu_count in (arg.sweep_start..=arg.sweep_end).step_by(arg.sweep_interval) {
        info!("Sweep step: {} CPUs", cpu_count);
        match run_comparison(&arg.generator_params(cpu_count), &balancing_params, rng) {
            Ok(machine_logs) => sweep_result.push_category(cpu_count, &machine_logs),
            Err(err) => error!("Skipping {} CPUs: {}", cpu_count, err),
        }
    }
    Ok(sweep_result)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let arg: ArgParser = ArgParser::parse();
    let seed = arg.seed.unwrap_or_else(rand::random);
    info!("Seed: {}", seed);
    let mut rng = StdRng::seed_from_u64(seed);
    let balancing_params = arg.balancing_params();

    if arg.sweep {
        let sweep_result = run_sweep(&arg, &mut rng)?;
        let file_path = create_scheduler_log_yaml_file(&arg.output_dir_path, "sweep")?;
        dump_run_info_to_yaml(
            &file_path,
            seed,
            &arg.generator_params(arg.sweep_start),
            &balancing_params,
        )?;
        sweep_result.dump_sweep_result_to_yaml(&file_path)?;
        info!("Sweep result written to {}", file_path);
    } else {
        let generator_params = arg.generator_params(arg.number_of_cpus);
        let machine_logs = run_comparison(&generator_params, &balancing_params, &mut rng)?;
        let file_path = create_scheduler_log_yaml_file(&arg.output_dir_path, "load_balancing")?;
        dump_run_info_to_yaml(&file_path, seed, &generator_params, &balancing_params)?;
        dump_machine_logs_to_yaml(&file_path, &machine_logs)?;
        info!("Machine logs written to {}", file_path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_generator_params(cpu_count: usize) -> GeneratorParams {
        GeneratorParams {
            cpu_count,
            min_length: 10,
            max_length: 20,
            min_usage: 0.05,
            max_usage: 0.3,
            min_delay: 0,
            max_delay: 2,
            min_burst_time: 2,
            max_burst_time: 6,
        }
    }

    #[test]
    fn test_arg_parser_defaults() {
        let arg = ArgParser::try_parse_from(["load_balancing"]).unwrap();
        assert_eq!(arg.number_of_cpus, 50);
        assert_eq!(arg.generator_params(50), GeneratorParams::default());
        assert_eq!(arg.balancing_params(), BalancingParams::default());
        assert!(!arg.sweep);
        assert_eq!(arg.seed, None);
    }

    #[test]
    fn test_arg_parser_overrides() {
        let arg = ArgParser::try_parse_from([
            "load_balancing",
            "-c",
            "8",
            "-p",
            "0.7",
            "--min_usage",
            "0.1",
            "--seed",
            "3",
            "--sweep",
        ])
        .unwrap();
        assert_eq!(arg.number_of_cpus, 8);
        assert_eq!(arg.upper_threshold, 0.7);
        assert_eq!(arg.generator_params(8).min_usage, 0.1);
        assert_eq!(arg.seed, Some(3));
        assert!(arg.sweep);
    }

    #[test]
    fn test_run_comparison_runs_every_algorithm() {
        let mut rng = StdRng::seed_from_u64(0);
        let machine_logs = run_comparison(
            &create_generator_params(4),
            &BalancingParams::default(),
            &mut rng,
        )
        .unwrap();

        let names: Vec<&str> = machine_logs.iter().map(|log| log.algorithm.as_str()).collect();
        assert_eq!(names, vec!["Algorithm #1", "Algorithm #2", "Algorithm #3"]);
        assert_eq!(machine_logs[0].usage_request_count, 0);
        assert_eq!(machine_logs[0].relocation_count, 0);
        for log in &machine_logs {
            assert_eq!(log.number_of_cpus, 4);
            assert!((0.0..=1.0).contains(&log.average_usage));
        }
    }

    #[test]
    fn test_run_comparison_rejects_inverted_ranges() {
        let mut rng = StdRng::seed_from_u64(0);
        let generator_params = GeneratorParams {
            min_delay: 3,
            max_delay: 1,
            ..create_generator_params(2)
        };
        assert!(run_comparison(&generator_params, &BalancingParams::default(), &mut rng).is_err());
    }

    #[test]
    fn test_run_sweep_skips_failing_configuration() {
        let mut arg = ArgParser::try_parse_from([
            "load_balancing",
            "--min_length",
            "5",
            "--max_length",
            "10",
            "--sweep_start",
            "0",
            "--sweep_end",
            "4",
            "--sweep_interval",
            "2",
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let sweep_result = run_sweep(&arg, &mut rng).unwrap();

        // Zero CPUs cannot form a machine, 2 and 4 CPUs succeed.
        let categories: Vec<usize> = sweep_result
            .average_usages
            .iter()
            .map(|category| category.category)
            .collect();
        assert_eq!(categories, vec![2, 4]);

        arg.sweep_interval = 0;
        assert!(run_sweep(&arg, &mut rng).is_err());
    }
}
