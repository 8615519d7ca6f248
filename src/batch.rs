use rayon::prelude::*;

use crate::program::Program;
use crate::scheduler::{Scheduler, SchedulerConfig, Stop};

/// Result of running one program to completion.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Everything the program printed.
    pub output: String,
    pub stop: Stop,
    pub steps: u64,
}

/// Run a single program until it halts, fails, blocks on input, or has
/// executed `step_limit` cycles. The program is handed back in its final
/// state, e.g. to feed it more input after `Stop::Blocked`.
pub fn run_to_completion(program: Program, step_limit: u64) -> (Program, RunSummary) {
    let config = SchedulerConfig {
        step_limit: Some(step_limit),
        ..Default::default()
    };
    let mut scheduler = Scheduler::new(program, config);
    let mut output = String::new();
    let stop = loop {
        let report = scheduler.run_batch();
        output.push_str(&report.output);
        if let Some(stop) = report.stop {
            break stop;
        }
    };
    let steps = scheduler.total_steps();
    (scheduler.into_machine(), RunSummary { output, stop, steps })
}

/// Run independent programs concurrently, one rayon task per program.
/// Results come back in the same order as `programs`.
pub fn run_all(programs: Vec<Program>, step_limit: u64) -> Vec<(Program, RunSummary)> {
    programs
        .into_par_iter()
        .map(|program| run_to_completion(program, step_limit))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FatalError;

    #[test]
    fn test_run_to_completion() {
        let (p, summary) = run_to_completion(Program::with_seed("12+n;", &[], 0), 100);
        assert_eq!(summary.output, "3");
        assert_eq!(summary.stop, Stop::Halted);
        assert_eq!(summary.steps, 5);
        assert!(p.has_terminated());
    }

    #[test]
    fn test_step_limit_stops_endless_program() {
        let (p, summary) = run_to_completion(Program::with_seed("1n", &[], 0), 10);
        assert_eq!(summary.stop, Stop::StepLimit);
        assert_eq!(summary.output, "11111");
        assert!(!p.has_terminated());
    }

    #[test]
    fn test_blocked_program_resumes_after_input() {
        let (mut p, summary) = run_to_completion(Program::with_seed("in;", &[], 0), 100);
        assert_eq!(summary.stop, Stop::Blocked);
        p.give_input("7").unwrap();
        let (p, summary) = run_to_completion(p, 100);
        assert_eq!(summary.stop, Stop::Halted);
        assert_eq!(summary.output, "55");
        assert!(p.has_terminated());
    }

    #[test]
    fn test_run_all_preserves_order() {
        let programs = vec![
            Program::with_seed("1n;", &[], 0),
            Program::with_seed("~", &[], 0),
            Program::with_seed("i", &[], 0),
            Program::with_seed("\"ab\"oo;", &[], 0),
        ];
        let results = run_all(programs, 1000);
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].1.output, "1");
        assert_eq!(
            results[1].1.stop,
            Stop::Failed(FatalError::StackUnderflow { needed: 1, found: 0 })
        );
        assert_eq!(results[2].1.stop, Stop::Blocked);
        assert!(!results[2].0.has_terminated());
        assert_eq!(results[3].1.output, "ba");
        assert!(results[3].0.has_terminated());
    }

    #[test]
    fn test_run_all_matches_sequential() {
        let sources = ["x1n", "x2n", "x3n", "x4n"];
        let make = || -> Vec<Program> {
            sources
                .iter()
                .enumerate()
                .map(|(i, s)| Program::with_seed(s, &[], i as u64))
                .collect()
        };
        let parallel: Vec<RunSummary> = run_all(make(), 64)
            .into_iter()
            .map(|(_, summary)| summary)
            .collect();
        let sequential: Vec<RunSummary> = make()
            .into_iter()
            .map(|p| run_to_completion(p, 64).1)
            .collect();
        assert_eq!(parallel, sequential);
    }
}
