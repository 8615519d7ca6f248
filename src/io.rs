use std::collections::VecDeque;

use crate::error::{InputExhausted, InvalidInput, NoOutputAvailable};

/// What `i` gets when it asks for a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Received {
    Char(char),
    /// The input was closed and everything queued has been consumed.
    EndOfInput,
}

/// Inbound character queue and outbound text buffer.
#[derive(Debug, Clone, Default)]
pub struct IoChannel {
    input: VecDeque<char>,
    closed: bool,
    output: String,
}

impl IoChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue exactly one character.
    pub fn give_input(&mut self, c: &str) -> Result<(), InvalidInput> {
        if self.closed {
            return Err(InvalidInput::Closed);
        }
        let mut chars = c.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => {
                self.input.push_back(ch);
                Ok(())
            }
            _ => Err(InvalidInput::NotOneChar(c.chars().count(), c.to_string())),
        }
    }

    /// No more input will arrive. Already queued characters are still read.
    pub fn close_input(&mut self) {
        self.closed = true;
    }

    pub fn is_input_closed(&self) -> bool {
        self.closed
    }

    pub fn receive(&mut self) -> Result<Received, InputExhausted> {
        match self.input.pop_front() {
            Some(c) => Ok(Received::Char(c)),
            None if self.closed => Ok(Received::EndOfInput),
            None => Err(InputExhausted),
        }
    }

    pub fn pending_input(&self) -> Vec<char> {
        self.input.iter().copied().collect()
    }

    pub fn emit(&mut self, text: impl std::fmt::Display) {
        use std::fmt::Write;
        // Writing into a String cannot fail.
        let _ = write!(self.output, "{text}");
    }

    /// Everything emitted since the previous call.
    pub fn read_output(&mut self) -> Result<String, NoOutputAvailable> {
        if self.output.is_empty() {
            Err(NoOutputAvailable)
        } else {
            Ok(std::mem::take(&mut self.output))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_fifo() {
        let mut io = IoChannel::new();
        io.give_input("a").unwrap();
        io.give_input("b").unwrap();
        assert_eq!(io.pending_input(), vec!['a', 'b']);
        assert_eq!(io.receive(), Ok(Received::Char('a')));
        assert_eq!(io.receive(), Ok(Received::Char('b')));
        assert_eq!(io.receive(), Err(InputExhausted));
    }

    #[test]
    fn test_give_input_rejects_wrong_length() {
        let mut io = IoChannel::new();
        assert_eq!(io.give_input(""), Err(InvalidInput::NotOneChar(0, String::new())));
        assert_eq!(io.give_input("ab"), Err(InvalidInput::NotOneChar(2, "ab".to_string())));
        assert!(io.pending_input().is_empty());
    }

    #[test]
    fn test_multibyte_input_is_one_char() {
        let mut io = IoChannel::new();
        io.give_input("é").unwrap();
        assert_eq!(io.receive(), Ok(Received::Char('é')));
    }

    #[test]
    fn test_closed_input_drains_then_ends() {
        let mut io = IoChannel::new();
        io.give_input("x").unwrap();
        io.close_input();
        assert_eq!(io.give_input("y"), Err(InvalidInput::Closed));
        assert_eq!(io.receive(), Ok(Received::Char('x')));
        assert_eq!(io.receive(), Ok(Received::EndOfInput));
        assert_eq!(io.receive(), Ok(Received::EndOfInput));
    }

    #[test]
    fn test_read_output_clears() {
        let mut io = IoChannel::new();
        assert_eq!(io.read_output(), Err(NoOutputAvailable));
        io.emit('h');
        io.emit(42);
        assert_eq!(io.read_output(), Ok("h42".to_string()));
        assert_eq!(io.read_output(), Err(NoOutputAvailable));
    }
}
