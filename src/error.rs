use thiserror::Error;

use crate::value::Value;

/// Errors that terminate a program. Once one of these is raised the program
/// keeps it as its terminal condition and ignores further `advance` calls.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum FatalError {
    #[error("stack underflow: needed {needed} value(s), found {found}")]
    StackUnderflow { needed: usize, found: usize },
    #[error("division by zero")]
    DivisionByZero,
    #[error("invalid instruction {0:?}")]
    InvalidInstruction(char),
    #[error("value {0} is not a valid character")]
    InvalidCharacter(Value),
    #[error("value {0} is not a valid grid coordinate")]
    InvalidCoordinate(Value),
    #[error("value {0} is not a valid stack count")]
    InvalidCount(Value),
    #[error("no stack to close")]
    NoEnclosingStack,
}

/// `i` found no pending character. Not fatal: the instruction is retried on
/// the next cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("input exhausted")]
pub struct InputExhausted;

/// Nothing was written since the last `read_output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no output available")]
pub struct NoOutputAvailable;

/// Rejected `give_input` call. Program state is untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    #[error("input must be exactly one character, got {0} ({1:?})")]
    NotOneChar(usize, String),
    #[error("input is closed")]
    Closed,
}

/// Failure to load a program from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
