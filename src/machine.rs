use crate::error::NoOutputAvailable;
use crate::program::{Program, Step};

/// Something a scheduler can drive one instruction cycle at a time.
///
/// `Program` is the implementation the crate ships; the scheduler is generic
/// over this trait so it never reaches into machine internals.
pub trait Machine {
    /// Run one instruction cycle. Must be a no-op returning the terminal
    /// `Step` once the machine has halted or failed.
    fn advance(&mut self) -> Step;

    fn has_terminated(&self) -> bool;

    /// Output produced since the previous call.
    fn read_output(&mut self) -> Result<String, NoOutputAvailable>;
}

impl Machine for Program {
    fn advance(&mut self) -> Step {
        Program::advance(self)
    }

    fn has_terminated(&self) -> bool {
        Program::has_terminated(self)
    }

    fn read_output(&mut self) -> Result<String, NoOutputAvailable> {
        Program::read_output(self)
    }
}
