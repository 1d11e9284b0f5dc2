use std::collections::hash_map::Entry;
use std::io::BufRead;
use std::str::FromStr;

use tracing::info;

use crate::error::LoadError;
use crate::grammar::{Decoded, Instruction, Program};

enum Line<'a> {
    Label(&'a str),
    Instruction(&'a str, Option<&'a str>),
}

struct Loader {
    program: Program,
}

impl Loader {
    fn new() -> Self {
        Loader {
            program: Program::default(),
        }
    }

    fn parse_line(text: &str, lineno: usize) -> Result<Option<Line<'_>>, LoadError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let starts_with_ws = text.chars().next().is_some_and(char::is_whitespace);
        if !starts_with_ws {
            if trimmed.contains(char::is_whitespace) {
                return Err(LoadError::LabelWhitespace { line: lineno });
            }
            return Ok(Some(Line::Label(trimmed)));
        }

        // The operand is everything after the opcode, so quoted
        // literals may contain spaces.
        let line = match trimmed.split_once(char::is_whitespace) {
            Some((opcode, operand)) => Line::Instruction(opcode, Some(operand.trim())),
            None => Line::Instruction(trimmed, None),
        };
        Ok(Some(line))
    }

    fn add_label(&mut self, name: &str, lineno: usize) -> Result<(), LoadError> {
        let ip = self.program.instructions.len();
        match self.program.labels.entry(name.to_string()) {
            Entry::Occupied(_) => Err(LoadError::DuplicateLabel {
                line: lineno,
                name: name.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(ip);
                Ok(())
            }
        }
    }

    fn add_instruction(
        &mut self,
        opcode: &str,
        operand: Option<&str>,
        lineno: usize,
    ) -> Result<(), LoadError> {
        let instr = match Instruction::decode(opcode, operand) {
            Decoded::Ok(instr) => instr,
            Decoded::Unknown => {
                return Err(LoadError::UnknownOpcode {
                    line: lineno,
                    opcode: opcode.to_string(),
                });
            }
            Decoded::MissingOperand => {
                return Err(LoadError::MissingOperand {
                    line: lineno,
                    opcode: opcode.to_string(),
                });
            }
            Decoded::UnexpectedOperand => {
                return Err(LoadError::UnexpectedOperand {
                    line: lineno,
                    opcode: opcode.to_string(),
                    operand: operand.unwrap_or_default().to_string(),
                });
            }
        };

        let ip = self.program.instructions.len();
        self.program.instructions.push(instr);
        self.program.lines.insert(ip, lineno);
        Ok(())
    }

    fn feed(&mut self, text: &str, lineno: usize) -> Result<(), LoadError> {
        match Self::parse_line(text, lineno)? {
            Some(Line::Label(name)) => self.add_label(name, lineno),
            Some(Line::Instruction(opcode, operand)) => {
                self.add_instruction(opcode, operand, lineno)
            }
            None => Ok(()),
        }
    }
}

/// Reads `.m2` assembly into a program.
pub fn load<R: BufRead>(reader: R) -> Result<Program, LoadError> {
    let mut loader = Loader::new();
    for (i, line) in reader.lines().enumerate() {
        loader.feed(&line?, i + 1)?;
    }

    info!(
        instructions = loader.program.instructions.len(),
        labels = loader.program.labels.len(),
        "program loaded"
    );
    Ok(loader.program)
}

impl FromStr for Program {
    type Err = LoadError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        load(text.as_bytes())
    }
}
