use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::io::{self, Write};

use thiserror::Error;

use crate::grammar::Instruction;

pub type Result<T> = std::result::Result<T, VmError>;

/// Conditions that abort a run. Match failures are not errors: they only
/// clear the switch.
#[derive(Debug, Error)]
pub enum VmError {
    #[error("end of input")]
    EndOfInput,
    #[error("missing label: {0}")]
    MissingLabel(String),
    #[error("BE: branch to error executed")]
    BranchError,
    #[error("ip {0} is outside the program")]
    IpOutOfRange(usize),
    #[error("no active stack frame")]
    NoActiveFrame,
    #[error("invalid generated-label slot {0}")]
    InvalidSlot(usize),
    #[error("required item missing")]
    Required,
    #[error("internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("line {line}: unknown opcode `{opcode}`")]
    UnknownOpcode { line: usize, opcode: String },
    #[error("line {line}: `{opcode}` requires an operand")]
    MissingOperand { line: usize, opcode: String },
    #[error("line {line}: `{opcode}` takes no operand, found `{operand}`")]
    UnexpectedOperand {
        line: usize,
        opcode: String,
        operand: String,
    },
    #[error("line {line}: whitespace is not allowed on label lines")]
    LabelWhitespace { line: usize },
    #[error("line {line}: duplicate label `{name}`")]
    DuplicateLabel { line: usize, name: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Host frames kept in a fault report.
const HOST_FRAMES: usize = 12;

/// One VM call-stack frame as captured for a fault report.
#[derive(Debug, Clone)]
pub struct FrameTrace {
    pub return_to: Option<usize>,
    pub instruction: Option<Instruction>,
}

/// A fatal error together with the machine state it happened in.
#[derive(Debug)]
pub struct Fault {
    pub error: VmError,
    pub ip: Option<usize>,
    pub line: Option<usize>,
    pub frames: Vec<FrameTrace>,
    backtrace: Backtrace,
}

impl Fault {
    pub fn new(
        error: VmError,
        ip: Option<usize>,
        line: Option<usize>,
        frames: Vec<FrameTrace>,
    ) -> Self {
        Self {
            error,
            ip,
            line,
            frames,
            backtrace: Backtrace::force_capture(),
        }
    }

    /// Symbol names of the innermost host frames, capture plumbing skipped.
    pub fn host_frames(&self) -> Vec<String> {
        if self.backtrace.status() != BacktraceStatus::Captured {
            return Vec::new();
        }
        self.backtrace
            .to_string()
            .lines()
            .filter_map(|line| {
                let (index, name) = line.trim_start().split_once(": ")?;
                index.parse::<usize>().ok()?;
                Some(name.trim().to_string())
            })
            .filter(|name| !name.contains("backtrace"))
            .take(HOST_FRAMES)
            .collect()
    }

    /// Writes the full diagnostic: headline, host stack, VM stack.
    pub fn report<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "{self}")?;

        let host = self.host_frames();
        if host.is_empty() {
            writeln!(w, "hoststack: unavailable")?;
        } else {
            writeln!(w, "hoststack:")?;
            for name in &host {
                writeln!(w, "  {name}")?;
            }
        }

        writeln!(w, "m2stack:")?;
        for frame in &self.frames {
            match (frame.return_to, &frame.instruction) {
                (Some(ip), Some(instr)) => writeln!(w, "{ip} {instr}")?,
                (Some(ip), None) => writeln!(w, "{ip} ?")?,
                (None, _) => writeln!(w, "?")?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed(")?;
        match self.ip {
            Some(ip) => write!(f, "ip={ip}")?,
            None => write!(f, "ip=?")?,
        }
        if let Some(line) = self.line {
            write!(f, ",lineno={line}")?;
        }
        write!(f, "):{}", self.error)
    }
}

impl std::error::Error for Fault {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// How a complete run can fail.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("run: incomplete")]
    Incomplete,
    #[error("{0}")]
    Fault(Box<Fault>),
}

impl From<Fault> for RunError {
    fn from(fault: Fault) -> Self {
        RunError::Fault(Box::new(fault))
    }
}
