use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use reef::batch::run_all;
use reef::error::{InvalidInput, LoadError};
use reef::scheduler::{Scheduler, SchedulerConfig, Stop};
use reef::{Program, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reef", about = "Stepping interpreter for the ><> (fish) language")]
struct Cli {
    /// Source files. Several files are run in parallel.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Initial stack, bottom first, comma separated (integers or floats).
    #[arg(long, value_delimiter = ',', value_parser = parse_value, allow_hyphen_values = true)]
    stack: Vec<Value>,

    /// Random seed for `x`, for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,

    /// Give up after this many instruction cycles.
    #[arg(long)]
    step_limit: Option<u64>,

    /// Instruction cycles between output flushes.
    #[arg(long, default_value_t = 1 << 10)]
    steps_per_batch: usize,

    /// Pause between batches, in milliseconds.
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    /// Text queued as input before the program starts.
    #[arg(long)]
    input: Option<String>,

    /// Keep reading input from stdin whenever the program waits for it
    /// (single file only). Without this, input ends after `--input`.
    #[arg(long)]
    stdin: bool,

    /// Log every executed instruction (overridden by RUST_LOG).
    #[arg(long)]
    trace: bool,
}

/// Parse an initial stack entry: integer if possible, float otherwise.
fn parse_value(s: &str) -> Result<Value, String> {
    if let Ok(i) = s.parse::<i64>() {
        return Ok(Value::Int(i));
    }
    s.parse::<f64>()
        .map(Value::Float)
        .map_err(|e| format!("Invalid stack value '{s}': {e}"))
}

fn load_source(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn feed(program: &mut Program, text: &str) -> Result<(), InvalidInput> {
    let mut buf = [0u8; 4];
    for c in text.chars() {
        program.give_input(c.encode_utf8(&mut buf))?;
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.trace { "trace" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut programs = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let source = match load_source(path) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        };
        let mut program = match cli.seed {
            Some(seed) => Program::with_seed(&source, &cli.stack, seed),
            None => Program::new(&source, &cli.stack),
        };
        if let Some(ref text) = cli.input {
            if let Err(e) = feed(&mut program, text) {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        programs.push(program);
    }

    if programs.len() == 1 {
        let mut program = programs.remove(0);
        if !cli.stdin {
            program.close_input();
        }
        std::process::exit(run_single(program, &cli));
    }

    if cli.stdin {
        eprintln!("--stdin needs exactly one source file");
        std::process::exit(1);
    }
    std::process::exit(run_many(programs, &cli));
}

fn run_single(program: Program, cli: &Cli) -> i32 {
    let config = SchedulerConfig {
        steps_per_batch: cli.steps_per_batch,
        delay: Duration::from_millis(cli.delay_ms),
        step_limit: cli.step_limit,
    };
    let mut scheduler = Scheduler::new(program, config);
    scheduler.subscribe(|report| {
        if !report.output.is_empty() {
            let mut stdout = std::io::stdout().lock();
            let _ = stdout.write_all(report.output.as_bytes());
            let _ = stdout.flush();
        }
    });

    let stdin = std::io::stdin();
    loop {
        match scheduler.run() {
            Stop::Halted => return 0,
            Stop::Failed(e) => {
                eprintln!("something smells fishy... ({e})");
                return 1;
            }
            Stop::StepLimit => {
                eprintln!("step limit reached after {} instructions", scheduler.total_steps());
                return 1;
            }
            Stop::Cancelled => return 1,
            Stop::Blocked => {
                let mut line = String::new();
                match stdin.lock().read_line(&mut line) {
                    Ok(0) => scheduler.machine_mut().close_input(),
                    Ok(_) => {
                        if let Err(e) = feed(scheduler.machine_mut(), &line) {
                            eprintln!("{e}");
                            return 1;
                        }
                    }
                    Err(e) => {
                        eprintln!("cannot read stdin: {e}");
                        return 1;
                    }
                }
            }
        }
    }
}

fn run_many(mut programs: Vec<Program>, cli: &Cli) -> i32 {
    for program in &mut programs {
        program.close_input();
    }
    let step_limit = cli.step_limit.unwrap_or(u64::MAX);
    let results = run_all(programs, step_limit);

    let mut status = 0;
    for (path, (_, summary)) in cli.files.iter().zip(&results) {
        println!("==> {} <==", path.display());
        print!("{}", summary.output);
        if !summary.output.is_empty() && !summary.output.ends_with('\n') {
            println!();
        }
        match summary.stop {
            Stop::Halted => {}
            Stop::Failed(e) => {
                eprintln!("{}: something smells fishy... ({e})", path.display());
                status = 1;
            }
            other => {
                eprintln!("{}: stopped after {} instructions ({other:?})", path.display(), summary.steps);
                status = 1;
            }
        }
    }
    status
}
