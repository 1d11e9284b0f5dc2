use crate::error::{Result, VmError};

/// Generated-label slots per frame (GN1, GN2).
pub const LABEL_SLOTS: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// `None` returns to "end of program".
    pub return_to: Option<usize>,
    slots: [Option<String>; LABEL_SLOTS],
}

impl Frame {
    pub fn new(return_to: Option<usize>) -> Self {
        Self {
            return_to,
            slots: Default::default(),
        }
    }

    fn cell(index: usize) -> Result<usize> {
        match index {
            1..=LABEL_SLOTS => Ok(index - 1),
            _ => Err(VmError::InvalidSlot(index)),
        }
    }

    /// Slots are numbered from 1; an unwritten slot reads as empty.
    pub fn local(&self, index: usize) -> Result<Option<&str>> {
        Ok(self.slots[Self::cell(index)?].as_deref())
    }

    pub fn set_local(&mut self, index: usize, value: String) -> Result<()> {
        self.slots[Self::cell(index)?] = Some(value);
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CallStack {
    frames: Vec<Frame>,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, return_to: Option<usize>) {
        self.frames.push(Frame::new(return_to));
    }

    /// `None` when the stack was already empty.
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn top(&self) -> Result<&Frame> {
        self.frames.last().ok_or(VmError::NoActiveFrame)
    }

    pub fn top_mut(&mut self) -> Result<&mut Frame> {
        self.frames.last_mut().ok_or(VmError::NoActiveFrame)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}
