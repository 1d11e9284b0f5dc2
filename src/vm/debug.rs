use std::io::{BufRead, Write};

use super::Machine;
use super::call::CallStack;
use crate::error::{Fault, FrameTrace, VmError};
use crate::grammar::Program;

/// Snapshot of the VM call stack, outermost frame first.
pub fn trace_frames(stack: &CallStack, program: Option<&Program>) -> Vec<FrameTrace> {
    stack
        .frames()
        .iter()
        .map(|frame| FrameTrace {
            return_to: frame.return_to,
            instruction: frame
                .return_to
                .and_then(|ip| program.and_then(|p| p.get(ip)))
                .cloned(),
        })
        .collect()
}

impl<'p, R: BufRead, W: Write> Machine<'p, R, W> {
    /// Wraps `error` with the state of the machine at the failing instruction.
    pub(crate) fn fault(&self, error: VmError) -> Fault {
        let ip = self.current.unwrap_or(self.ip);
        Fault::new(
            error,
            Some(ip),
            self.program.line_of(ip),
            trace_frames(&self.stack, Some(self.program)),
        )
    }
}
