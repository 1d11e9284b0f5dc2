use std::io::Write;

use crate::error::{Result, VmError};

/// Column at which instruction lines start.
pub const PROGRAM_INDENT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Label,
    Program,
}

/// Line writer with a label column and a program column. A finished line
/// carries one or the other, never both.
pub struct Emitter<W> {
    out: W,
    label: String,
    program: String,
    field: Field,
    indent: usize,
}

impl<W: Write> Emitter<W> {
    pub fn new(out: W) -> Self {
        Self::with_indent(out, PROGRAM_INDENT)
    }

    pub fn with_indent(out: W, indent: usize) -> Self {
        Self {
            out,
            label: String::new(),
            program: String::new(),
            field: Field::Program,
            indent,
        }
    }

    pub fn select_label_field(&mut self) -> Result<()> {
        if self.field == Field::Label {
            return Err(VmError::Internal("label field already selected".into()));
        }
        self.field = Field::Label;
        Ok(())
    }

    pub fn write(&mut self, s: &str) {
        match self.field {
            Field::Label => {
                self.label = s.to_string();
                self.field = Field::Program;
            }
            Field::Program => self.program.push_str(s),
        }
    }

    pub fn flush_line(&mut self) -> Result<()> {
        if !self.label.is_empty() {
            if !self.program.is_empty() {
                return Err(VmError::Internal(format!(
                    "label and instruction on same line: {:?} {:?}",
                    self.label, self.program
                )));
            }
            writeln!(self.out, "{}", self.label.trim())?;
        } else {
            writeln!(self.out, "{:indent$}{}", "", self.program.trim(), indent = self.indent)?;
        }

        self.label.clear();
        self.program.clear();
        self.field = Field::Program;
        Ok(())
    }

    /// Terminates a successful run with a blank line.
    pub fn finish(&mut self) -> Result<()> {
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emitted(e: Emitter<Vec<u8>>) -> String {
        String::from_utf8(e.into_inner()).unwrap()
    }

    #[test]
    fn program_line_is_indented_and_trimmed() {
        let mut e = Emitter::new(Vec::new());
        e.write("TST ");
        e.write("'x' ");
        e.flush_line().unwrap();
        assert_eq!(emitted(e), "        TST 'x'\n");
    }

    #[test]
    fn label_line_at_column_zero() {
        let mut e = Emitter::new(Vec::new());
        e.select_label_field().unwrap();
        e.write("A01");
        e.flush_line().unwrap();
        e.write("R");
        e.flush_line().unwrap();
        assert_eq!(emitted(e), "A01\n        R\n");
    }

    #[test]
    fn label_write_returns_cursor_to_program() {
        let mut e = Emitter::new(Vec::new());
        e.select_label_field().unwrap();
        e.write("L");
        e.write("B X");
        assert!(matches!(e.flush_line(), Err(VmError::Internal(_))));
    }

    #[test]
    fn selecting_label_twice_is_internal_error() {
        let mut e = Emitter::new(Vec::new());
        e.select_label_field().unwrap();
        assert!(matches!(e.select_label_field(), Err(VmError::Internal(_))));
    }

    #[test]
    fn custom_indent() {
        let mut e = Emitter::with_indent(Vec::new(), 2);
        e.write("END");
        e.flush_line().unwrap();
        e.finish().unwrap();
        assert_eq!(emitted(e), "  END\n\n");
    }
}
