pub mod error;
pub mod value;
pub mod stack;
pub mod grid;
pub mod pointer;
pub mod io;
pub mod executor;
pub mod program;
pub mod machine;
pub mod scheduler;
pub mod batch;

pub use error::{FatalError, InputExhausted, InvalidInput, NoOutputAvailable};
pub use program::{Program, Step, Termination};
pub use value::Value;
