//! Shared helpers for the integration tests.

#![allow(dead_code)]

pub use meta_ii::compiler::Compiler;
pub use meta_ii::error::{Fault, RunError, VmError};
pub use meta_ii::grammar::{Instruction, Program};
pub use meta_ii::vm::VM;

/// The META-II grammar, written in itself.
pub const META_II: &str = "\
.SYNTAX PROGRAM

OUT1 = '*1' .OUT('GN1') / '*2' .OUT('GN2') / '*' .OUT('CI')
     / .STRING .OUT('CL ' *) ;

OUTPUT = ( '.OUT' '(' $ OUT1 ')' / '.LABEL' .OUT('LB') OUT1 ) .OUT('OUT') ;

EX3 = .ID .OUT('CLL ' *) / .STRING .OUT('TST ' *) / '.ID' .OUT('ID')
    / '.NUMBER' .OUT('NUM') / '.STRING' .OUT('SR') / '(' EX1 ')'
    / '.EMPTY' .OUT('SET') / '$' .LABEL *1 EX3 .OUT('BT ' *1) .OUT('SET') ;

EX2 = ( EX3 .OUT('BF ' *1) / OUTPUT ) $ ( EX3 .OUT('BE') / OUTPUT ) .LABEL *1 ;

EX1 = EX2 $ ( '/' .OUT('BT ' *1) EX2 ) .LABEL *1 ;

ST = .ID .LABEL * '=' EX1 ';' .OUT('R') ;

PROGRAM = '.SYNTAX' .ID .OUT('B ' *) $ ST '.END' .OUT('END') ;

.END
";

/// Loads `asm` and runs it over `input`, returning the result and whatever
/// reached the output.
pub fn run_asm(asm: &str, input: &str) -> (Result<(), RunError>, String) {
    let program: Program = asm.parse().expect("program loads");
    let mut out = Vec::new();
    let result = VM::new(program).run(input.as_bytes(), &mut out);
    (result, String::from_utf8(out).expect("utf-8 output"))
}

/// Compiles a grammar with the built-in compiler.
pub fn compile(grammar: &str) -> Result<String, RunError> {
    let mut out = Vec::new();
    Compiler::new(grammar.as_bytes(), &mut out).compile()?;
    Ok(String::from_utf8(out).expect("utf-8 output"))
}

/// Unwraps the fault of a failed run.
pub fn expect_fault(result: Result<(), RunError>) -> Box<Fault> {
    match result {
        Err(RunError::Fault(fault)) => fault,
        other => panic!("expected a fault, got {other:?}"),
    }
}
