use rand::Rng;
use rand::rngs::SmallRng;

use crate::error::{FatalError, InputExhausted};
use crate::grid::Grid;
use crate::io::{IoChannel, Received};
use crate::pointer::{Direction, InstructionPointer, Mirror};
use crate::stack::{Stack, Stacks};
use crate::value::Value;

/// How the pointer proceeds after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Move one cell along the current direction.
    Next,
    /// Move two cells: the next cell is skipped.
    Skip,
    /// The instruction placed the pointer itself; do not move.
    Jumped,
    Halt,
}

/// Why an instruction did not complete.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interrupt {
    /// Retry the same cell later. Nothing was mutated.
    Blocked(InputExhausted),
    Fatal(FatalError),
}

impl From<FatalError> for Interrupt {
    fn from(e: FatalError) -> Self {
        Interrupt::Fatal(e)
    }
}

impl From<InputExhausted> for Interrupt {
    fn from(e: InputExhausted) -> Self {
        Interrupt::Blocked(e)
    }
}

/// All mutable machine state except the codebox, plus the dispatch table.
#[derive(Debug, Clone)]
pub struct Executor {
    pub ip: InstructionPointer,
    pub stacks: Stacks,
    pub io: IoChannel,
    /// The quote character that opened string mode, if active.
    pub string_mode: Option<char>,
    rng: SmallRng,
}

impl Executor {
    pub fn new(initial: Stack, rng: SmallRng) -> Self {
        Self {
            ip: InstructionPointer::default(),
            stacks: Stacks::new(initial),
            io: IoChannel::new(),
            string_mode: None,
            rng,
        }
    }

    fn stack(&mut self) -> &mut Stack {
        self.stacks.active_mut()
    }

    /// Execute `c`, the character under the pointer. The pointer itself is
    /// only touched by direction changes and jumps; moving on is the
    /// caller's job, driven by the returned `Flow`.
    pub fn execute(&mut self, grid: &Grid, c: char) -> Result<Flow, Interrupt> {
        if let Some(quote) = self.string_mode {
            if c == quote {
                self.string_mode = None;
            } else {
                self.stack().push(c);
            }
            return Ok(Flow::Next);
        }

        match c {
            '0'..='9' => self.stack().push(c as i64 - '0' as i64),
            'a'..='f' => self.stack().push(c as i64 - 'a' as i64 + 10),

            '+' => self.binary(|y, x| Ok(y.add(x)))?,
            '-' => self.binary(|y, x| Ok(y.sub(x)))?,
            '*' => self.binary(|y, x| Ok(y.mul(x)))?,
            ',' => self.binary(Value::div)?,
            '%' => self.binary(Value::rem)?,
            '=' => self.binary(|y, x| Ok((y == x).into()))?,
            ')' => self.binary(|y, x| Ok((y > x).into()))?,
            '(' => self.binary(|y, x| Ok((y < x).into()))?,

            ':' => self.stack().duplicate()?,
            '~' => self.stack().remove()?,
            '$' => self.stack().swap_top2()?,
            '@' => self.stack().swap_top3()?,
            '}' => self.stack().shift_right(),
            '{' => self.stack().shift_left(),
            'r' => self.stack().reverse(),
            'l' => {
                let len = self.stack().len() as i64;
                self.stack().push(len);
            }
            '&' => self.stack().toggle_register()?,
            '[' => {
                let n = self.stack().peek(0)?;
                let count = n.to_i64().ok().and_then(|n| usize::try_from(n).ok());
                let count = count.ok_or(FatalError::InvalidCount(n))?;
                // The count itself plus `count` values beneath it.
                self.stack().peek(count)?;
                self.stack().pop()?;
                self.stacks.open(count)?;
            }
            ']' => self.stacks.close()?,

            '>' => self.ip.set_direction(Direction::Right),
            '<' => self.ip.set_direction(Direction::Left),
            '^' => self.ip.set_direction(Direction::Up),
            'v' => self.ip.set_direction(Direction::Down),
            'x' => {
                let d = Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())];
                self.ip.set_direction(d);
            }
            '/' | '\\' | '|' | '_' | '#' => {
                if let Some(mirror) = Mirror::from_char(c) {
                    self.ip.reflect(mirror);
                }
            }

            '!' => return Ok(Flow::Skip),
            '?' => {
                if self.stack().pop()?.is_zero() {
                    return Ok(Flow::Skip);
                }
            }
            '.' => {
                let (x, y) = self.stack().peek2()?;
                let (x, y) = (x.to_i64()?, y.to_i64()?);
                self.stack().pop2()?;
                self.ip.jump_to(x, y, grid);
                return Ok(Flow::Jumped);
            }

            '"' | '\'' => self.string_mode = Some(c),

            'n' => {
                let v = self.stack().pop()?;
                self.io.emit(v);
            }
            'o' => {
                let c = to_char(self.stack().peek(0)?)?;
                self.stack().pop()?;
                self.io.emit(c);
            }
            'i' => match self.io.receive()? {
                Received::Char(ch) => self.stack().push(ch),
                Received::EndOfInput => self.stack().push(-1i64),
            },
            'g' => {
                let (x, y) = self.stack().peek2()?;
                let (x, y) = (x.to_i64()?, y.to_i64()?);
                self.stack().pop2()?;
                let cell = match (usize::try_from(x), usize::try_from(y)) {
                    (Ok(x), Ok(y)) => grid.stored(x, y).map_or(0, |ch| ch as i64),
                    _ => 0,
                };
                self.stack().push(cell);
            }

            ';' => return Ok(Flow::Halt),
            c if c.is_whitespace() || c == '\0' => {}
            c => return Err(FatalError::InvalidInstruction(c).into()),
        }
        Ok(Flow::Next)
    }

    /// Replace x (top) and y (below it) with `op(y, x)`. The operands stay
    /// on the stack if `op` fails.
    fn binary(
        &mut self,
        op: impl FnOnce(Value, Value) -> Result<Value, FatalError>,
    ) -> Result<(), FatalError> {
        let (y, x) = self.stack().peek2()?;
        let result = op(y, x)?;
        self.stack().pop2()?;
        self.stack().push(result);
        Ok(())
    }
}

fn to_char(v: Value) -> Result<char, FatalError> {
    v.to_i64()
        .ok()
        .and_then(|code| u32::try_from(code).ok())
        .and_then(char::from_u32)
        .ok_or(FatalError::InvalidCharacter(v))
}
