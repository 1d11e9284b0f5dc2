pub mod call;
pub mod debug;
pub mod exec;
pub mod labels;

use std::io::{BufRead, Write};

use tracing::info;

use crate::emitter::Emitter;
use crate::error::RunError;
use crate::grammar::Program;
use crate::lexer::Lexer;
use call::CallStack;
use labels::LabelGenerator;

/// A loaded program, ready to be run against any number of inputs.
pub struct VM {
    program: Program,
}

/// Registers and run-scoped state for a single execution.
pub struct Machine<'p, R, W> {
    // Loaded program (read-only for the run)
    program: &'p Program,

    // Registers
    ip: usize,
    current: Option<usize>,
    switch: bool,
    finished: bool,
    ended: bool,

    // Collaborators
    stack: CallStack,
    lexer: Lexer<R>,
    emitter: Emitter<W>,
    labels: LabelGenerator,
}

impl VM {
    pub fn new(program: Program) -> Self {
        Self { program }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Runs the program over `input`, writing emitted lines to `output`.
    /// A run that terminates with the switch off is `Incomplete`.
    pub fn run<R: BufRead, W: Write>(&self, input: R, output: W) -> Result<(), RunError> {
        let mut machine = Machine::new(&self.program, input, output);

        let matched = match machine.execute() {
            Ok(matched) => matched,
            Err(error) => return Err(machine.fault(error).into()),
        };
        if !matched {
            return Err(RunError::Incomplete);
        }

        if let Err(error) = machine.emitter.finish() {
            return Err(machine.fault(error).into());
        }
        info!(instructions = self.program.len(), "run complete");
        Ok(())
    }
}

impl<'p, R: BufRead, W: Write> Machine<'p, R, W> {
    pub fn new(program: &'p Program, input: R, output: W) -> Self {
        Self {
            program,
            ip: 0,
            current: None,
            switch: false,
            finished: false,
            ended: false,
            stack: CallStack::new(),
            lexer: Lexer::new(input),
            emitter: Emitter::new(output),
            labels: LabelGenerator::new(),
        }
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn switch(&self) -> bool {
        self.switch
    }

    pub fn stack(&self) -> &CallStack {
        &self.stack
    }
}
