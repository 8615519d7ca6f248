use std::collections::VecDeque;

use crate::error::FatalError;
use crate::value::Value;

/// A growable LIFO of values plus its register slot. The back of the
/// deque is the top, so `{` and `}` rotate in constant time.
///
/// Every operation that needs more values than are present fails with
/// `StackUnderflow` and leaves the stack unchanged.
#[derive(Debug, Clone, Default)]
pub struct Stack {
    values: VecDeque<Value>,
    register: Option<Value>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a stack from values listed bottom-to-top.
    pub fn from_values(values: Vec<Value>) -> Self {
        Self { values: values.into(), register: None }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline(always)]
    fn require(&self, needed: usize) -> Result<(), FatalError> {
        if self.values.len() < needed {
            Err(FatalError::StackUnderflow { needed, found: self.values.len() })
        } else {
            Ok(())
        }
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.values.push_back(value.into());
    }

    pub fn pop(&mut self) -> Result<Value, FatalError> {
        self.values
            .pop_back()
            .ok_or(FatalError::StackUnderflow { needed: 1, found: 0 })
    }

    /// Pop two values, returned as `(below, top)`.
    pub fn pop2(&mut self) -> Result<(Value, Value), FatalError> {
        self.require(2)?;
        let top = self.pop()?;
        let below = self.pop()?;
        Ok((below, top))
    }

    /// Read the value `n` places below the top (0 = top).
    pub fn peek(&self, n: usize) -> Result<Value, FatalError> {
        self.require(n + 1)?;
        Ok(self.values[self.values.len() - 1 - n])
    }

    /// Read the top two values as `(below, top)` without removing them.
    pub fn peek2(&self) -> Result<(Value, Value), FatalError> {
        self.require(2)?;
        Ok((self.peek(1)?, self.peek(0)?))
    }

    pub fn duplicate(&mut self) -> Result<(), FatalError> {
        let top = self.peek(0)?;
        self.values.push_back(top);
        Ok(())
    }

    pub fn remove(&mut self) -> Result<(), FatalError> {
        self.pop().map(|_| ())
    }

    /// `a b -> b a`
    pub fn swap_top2(&mut self) -> Result<(), FatalError> {
        self.require(2)?;
        let len = self.values.len();
        self.values.swap(len - 1, len - 2);
        Ok(())
    }

    /// `a b c -> c a b`: the top moves two places down.
    pub fn swap_top3(&mut self) -> Result<(), FatalError> {
        self.require(3)?;
        let len = self.values.len();
        self.values.make_contiguous()[len - 3..].rotate_right(1);
        Ok(())
    }

    /// Move the top value to the bottom.
    pub fn shift_right(&mut self) {
        if let Some(top) = self.values.pop_back() {
            self.values.push_front(top);
        }
    }

    /// Move the bottom value to the top.
    pub fn shift_left(&mut self) {
        if let Some(bottom) = self.values.pop_front() {
            self.values.push_back(bottom);
        }
    }

    pub fn reverse(&mut self) {
        self.values.make_contiguous().reverse();
    }

    /// `&`: park the top value in the empty register, or push the parked
    /// value back and empty the register.
    pub fn toggle_register(&mut self) -> Result<(), FatalError> {
        match self.register.take() {
            Some(value) => self.values.push_back(value),
            None => self.register = Some(self.pop()?),
        }
        Ok(())
    }

    pub fn register(&self) -> Option<Value> {
        self.register
    }

    /// Split off the top `n` values into a new stack with an empty register.
    pub fn split_off_top(&mut self, n: usize) -> Result<Stack, FatalError> {
        self.require(n)?;
        let at = self.values.len() - n;
        Ok(Stack { values: self.values.split_off(at), register: None })
    }

    /// Append another stack's values on top of this one. The other stack's
    /// register is dropped.
    pub fn absorb(&mut self, other: Stack) {
        self.values.extend(other.values);
    }

    /// Bottom-to-top copy of the contents; index 0 is the bottom.
    pub fn snapshot(&self) -> Vec<Value> {
        self.values.iter().copied().collect()
    }
}

/// The stack of stacks driven by `[` and `]`. There is always at least one
/// stack; the last one is the active stack.
#[derive(Debug, Clone)]
pub struct Stacks {
    inner: Vec<Stack>,
}

impl Stacks {
    pub fn new(initial: Stack) -> Self {
        Self { inner: vec![initial] }
    }

    pub fn active(&self) -> &Stack {
        // Never empty: `close` refuses to remove the last stack.
        &self.inner[self.inner.len() - 1]
    }

    pub fn active_mut(&mut self) -> &mut Stack {
        let last = self.inner.len() - 1;
        &mut self.inner[last]
    }

    pub fn depth(&self) -> usize {
        self.inner.len()
    }

    /// `[`: move the top `n` values of the active stack onto a fresh stack.
    pub fn open(&mut self, n: usize) -> Result<(), FatalError> {
        let fresh = self.active_mut().split_off_top(n)?;
        self.inner.push(fresh);
        Ok(())
    }

    /// `]`: drop the active stack, pushing its values onto the one beneath.
    pub fn close(&mut self) -> Result<(), FatalError> {
        if self.inner.len() < 2 {
            return Err(FatalError::NoEnclosingStack);
        }
        if let Some(closed) = self.inner.pop() {
            self.active_mut().absorb(closed);
        }
        Ok(())
    }
}
