use tracing::debug;

use super::call::Frame;
use crate::error::{Result, VmError};

/// Per-sequence label counters: sequence 1 yields A01, A02, ..., sequence 2
/// yields B01, ...
#[derive(Debug, Clone, Default)]
pub struct LabelGenerator {
    counters: Vec<u32>,
}

impl LabelGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_label(&mut self, index: usize) -> Result<String> {
        if !(1..=26).contains(&index) {
            return Err(VmError::InvalidSlot(index));
        }
        if self.counters.len() < index {
            self.counters.resize(index, 0);
        }

        let counter = &mut self.counters[index - 1];
        *counter += 1;
        let letter = (b'A' + (index - 1) as u8) as char;
        Ok(format!("{letter}{:02}", *counter))
    }

    /// Label held in the frame's slot, allocating one on first use.
    pub fn generate(&mut self, frame: &mut Frame, index: usize) -> Result<String> {
        if let Some(label) = frame.local(index)? {
            return Ok(label.to_string());
        }

        let label = self.next_label(index)?;
        frame.set_local(index, label.clone())?;
        debug!(index, %label, "generated label");
        Ok(label)
    }
}
