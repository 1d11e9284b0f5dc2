pub mod compiler;
pub mod emitter;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod loader;
pub mod vm;

pub use compiler::Compiler;
pub use error::{Fault, LoadError, RunError, VmError};
pub use grammar::{Instruction, Program};
pub use vm::VM;
