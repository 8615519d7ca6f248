use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, trace, warn};

use crate::error::{FatalError, InputExhausted, InvalidInput, NoOutputAvailable};
use crate::executor::{Executor, Flow, Interrupt};
use crate::grid::Grid;
use crate::pointer::InstructionPointer;
use crate::stack::Stack;
use crate::value::Value;

/// Outcome of one `advance` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// An instruction ran and the program can continue.
    Progressed,
    /// `i` found no input. Nothing changed; the same cell runs again next time.
    Blocked(InputExhausted),
    /// `;` was reached, now or earlier.
    Halted,
    /// A fatal error ended the program, now or earlier.
    Failed(FatalError),
}

impl Step {
    pub fn is_terminal(self) -> bool {
        matches!(self, Step::Halted | Step::Failed(_))
    }
}

/// How a finished program ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Termination {
    Halted,
    Failed(FatalError),
}

impl From<Termination> for Step {
    fn from(t: Termination) -> Self {
        match t {
            Termination::Halted => Step::Halted,
            Termination::Failed(e) => Step::Failed(e),
        }
    }
}

/// A loaded ><> program: codebox plus machine state.
///
/// The only way to run it is `advance`, one instruction cycle per call.
/// Once halted or failed it stays that way.
#[derive(Debug, Clone)]
pub struct Program {
    grid: Grid,
    executor: Executor,
    termination: Option<Termination>,
    steps: u64,
}

impl Program {
    /// Load `source` with `initial_stack` listed bottom-to-top. `x` draws
    /// from an entropy-seeded generator.
    pub fn new(source: &str, initial_stack: &[Value]) -> Self {
        Self::with_rng(source, initial_stack, SmallRng::from_entropy())
    }

    /// Like `new`, but `x` is reproducible for a given `seed`.
    pub fn with_seed(source: &str, initial_stack: &[Value], seed: u64) -> Self {
        Self::with_rng(source, initial_stack, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(source: &str, initial_stack: &[Value], rng: SmallRng) -> Self {
        let grid = Grid::new(source);
        debug!(width = grid.width(), height = grid.height(), "program loaded");
        let stack = Stack::from_values(initial_stack.to_vec());
        Self {
            grid,
            executor: Executor::new(stack, rng),
            termination: None,
            steps: 0,
        }
    }

    /// Run one instruction cycle: read the cell under the pointer, execute
    /// it, then move on (twice for a taken trampoline, not at all after a
    /// jump, halt, block or failure).
    pub fn advance(&mut self) -> Step {
        if let Some(t) = self.termination {
            return t.into();
        }

        let ip = self.executor.ip;
        let c = self.grid.char_at(ip.x, ip.y);
        trace!(x = ip.x, y = ip.y, instruction = %c.escape_debug(), "execute");

        match self.executor.execute(&self.grid, c) {
            Ok(flow) => {
                self.steps += 1;
                match flow {
                    Flow::Next => self.executor.ip.move_on(&self.grid),
                    Flow::Skip => {
                        self.executor.ip.move_on(&self.grid);
                        self.executor.ip.move_on(&self.grid);
                    }
                    Flow::Jumped => {}
                    Flow::Halt => {
                        debug!(steps = self.steps, "halted");
                        self.termination = Some(Termination::Halted);
                        return Step::Halted;
                    }
                }
                Step::Progressed
            }
            Err(Interrupt::Blocked(e)) => {
                debug!(x = ip.x, y = ip.y, "waiting for input");
                Step::Blocked(e)
            }
            Err(Interrupt::Fatal(e)) => {
                self.steps += 1;
                warn!(x = ip.x, y = ip.y, error = %e, "something smells fishy");
                self.termination = Some(Termination::Failed(e));
                Step::Failed(e)
            }
        }
    }

    /// Everything `n`/`o` produced since the last call.
    pub fn read_output(&mut self) -> Result<String, NoOutputAvailable> {
        self.executor.io.read_output()
    }

    /// Queue exactly one character for `i`.
    pub fn give_input(&mut self, c: &str) -> Result<(), InvalidInput> {
        self.executor.io.give_input(c)
    }

    /// Signal that no more input will come; `i` then reads -1 once the queue
    /// is drained instead of blocking.
    pub fn close_input(&mut self) {
        self.executor.io.close_input();
    }

    pub fn instruction_pointer(&self) -> InstructionPointer {
        self.executor.ip
    }

    pub fn input_buffer(&self) -> Vec<char> {
        self.executor.io.pending_input()
    }

    /// The active stack, bottom-to-top.
    pub fn stack(&self) -> Vec<Value> {
        self.executor.stacks.active().snapshot()
    }

    pub fn register(&self) -> Option<Value> {
        self.executor.stacks.active().register()
    }

    pub fn stack_depth(&self) -> usize {
        self.executor.stacks.depth()
    }

    pub fn is_string_mode(&self) -> bool {
        self.executor.string_mode.is_some()
    }

    pub fn has_terminated(&self) -> bool {
        self.termination.is_some()
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    pub fn error(&self) -> Option<FatalError> {
        match self.termination {
            Some(Termination::Failed(e)) => Some(e),
            _ => None,
        }
    }

    /// Completed instruction cycles, including the one that failed.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn digit_programs_push_their_digits(digits in prop::collection::vec(0i64..16, 0..32)) {
            let source: String = digits
                .iter()
                .map(|&d| std::char::from_digit(d as u32, 16).unwrap_or('0'))
                .chain(std::iter::once(';'))
                .collect();
            let mut p = Program::with_seed(&source, &[], 0);
            for _ in 0..=digits.len() {
                p.advance();
            }
            prop_assert!(p.has_terminated());
            prop_assert_eq!(p.termination(), Some(Termination::Halted));
            let expected: Vec<Value> = digits.iter().map(|&d| Value::Int(d)).collect();
            prop_assert_eq!(p.stack(), expected);
        }

        #[test]
        fn random_programs_never_panic(
            rows in prop::collection::vec("[ -~]{0,12}", 1..6),
            seed in any::<u64>(),
        ) {
            let source = rows.join("\n");
            let mut p = Program::with_seed(&source, &[], seed);
            p.close_input();
            let grid = p.grid().clone();
            for _ in 0..500 {
                let step = p.advance();
                let ip = p.instruction_pointer();
                prop_assert!(ip.x < grid.width() && ip.y < grid.height());
                if step.is_terminal() {
                    prop_assert!(p.has_terminated());
                    prop_assert!(p.advance().is_terminal());
                    break;
                }
            }
        }
    }
}
