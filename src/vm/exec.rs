use std::io::{BufRead, Write};

use tracing::{debug, trace};

use super::Machine;
use crate::error::{Result, VmError};
use crate::grammar::{Instruction, unquote};

impl<'p, R: BufRead, W: Write> Machine<'p, R, W> {
    /// Fetch/decode/execute until END or a return from the outermost frame.
    /// END always succeeds; returning from the outermost frame yields the
    /// switch.
    pub fn execute(&mut self) -> Result<bool> {
        while !self.finished {
            let instr = self.fetch()?;
            trace!(ip = self.current, %instr, "exec");
            self.step(instr)?;
        }
        Ok(self.ended || self.switch)
    }

    fn fetch(&mut self) -> Result<&'p Instruction> {
        let program = self.program;
        self.current = Some(self.ip);
        let instr = program
            .get(self.ip)
            .ok_or(VmError::IpOutOfRange(self.ip))?;
        self.ip += 1;
        Ok(instr)
    }

    fn step(&mut self, instr: &'p Instruction) -> Result<()> {
        match instr {
            Instruction::Tst(literal) => self.switch = self.lexer.literal(unquote(literal))?,
            Instruction::Id => self.switch = self.lexer.identifier()?,
            Instruction::Num => self.switch = self.lexer.number()?,
            Instruction::Sr => self.switch = self.lexer.quoted_string()?,
            Instruction::Cll(label) => self.call(label)?,
            Instruction::R => self.ret(),
            Instruction::Set => self.switch = true,
            Instruction::B(label) => self.jump(label)?,
            Instruction::Bt(label) => {
                if self.switch {
                    self.jump(label)?;
                }
            }
            Instruction::Bf(label) => {
                if !self.switch {
                    self.jump(label)?;
                }
            }
            Instruction::Be => {
                if !self.switch {
                    return Err(VmError::BranchError);
                }
            }
            // One write: on the label field a second write would spill
            // into the program field.
            Instruction::Cl(literal) => self.emitter.write(&format!("{} ", unquote(literal))),
            Instruction::Ci => self.emitter.write(self.lexer.recall()),
            Instruction::Gn1 => self.generate(1)?,
            Instruction::Gn2 => self.generate(2)?,
            Instruction::Lb => self.emitter.select_label_field()?,
            Instruction::Out => self.emitter.flush_line()?,
            Instruction::End => {
                self.ended = true;
                self.finished = true;
            }
        }
        Ok(())
    }

    // =========================================================
    // Control flow
    // =========================================================

    fn resolve(&self, label: &str) -> Result<usize> {
        self.program
            .resolve(label)
            .ok_or_else(|| VmError::MissingLabel(label.to_string()))
    }

    fn jump(&mut self, label: &str) -> Result<()> {
        self.ip = self.resolve(label)?;
        Ok(())
    }

    fn call(&mut self, label: &str) -> Result<()> {
        let target = self.resolve(label)?;
        debug!(label, return_to = self.ip, depth = self.stack.depth(), "call");
        self.stack.push(Some(self.ip));
        self.ip = target;
        Ok(())
    }

    fn ret(&mut self) {
        match self.stack.pop() {
            Some(frame) => match frame.return_to {
                Some(ip) => {
                    debug!(return_to = ip, depth = self.stack.depth(), "return");
                    self.ip = ip;
                }
                None => self.finished = true,
            },
            None => {
                debug!("return from outermost frame");
                self.finished = true;
            }
        }
    }

    // =========================================================
    // Label generation
    // =========================================================

    fn generate(&mut self, index: usize) -> Result<()> {
        let frame = self.stack.top_mut()?;
        let label = self.labels.generate(frame, index)?;
        self.emitter.write(&label);
        Ok(())
    }
}
