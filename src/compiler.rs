// Hand-written META-II compiler. Reads a grammar and emits VM assembly.
//
// PROGRAM = '.SYNTAX' .ID .OUT('B ' *) $ ST '.END' .OUT('END') ;
// ST      = .ID .LABEL * '=' EX1 ';' .OUT('R') ;
// EX1     = EX2 $('/' .OUT('BT ' *1) EX2) .LABEL *1 ;
// EX2     = (EX3 .OUT('BF ' *1) / OUTPUT) $(EX3 .OUT('BE') / OUTPUT) .LABEL *1 ;
// EX3     = .ID .OUT('CLL ' *) / .STRING .OUT('TST ' *) / '.ID' .OUT('ID')
//         / '.NUMBER' .OUT('NUM') / '.STRING' .OUT('SR') / '(' EX1 ')'
//         / '.EMPTY' .OUT('SET') / '$' .LABEL *1 EX3 .OUT('BT ' *1) .OUT('SET') ;
// OUTPUT  = ('.OUT' '(' $ OUT1 ')' / '.LABEL' .OUT('LB') OUT1) .OUT('OUT') ;
// OUT1    = '*1' .OUT('GN1') / '*2' .OUT('GN2') / '*' .OUT('CI')
//         / .STRING .OUT('CL ' *) ;

use std::io::{BufRead, Write};

use tracing::info;

use crate::emitter::Emitter;
use crate::error::{Fault, Result, RunError, VmError};
use crate::lexer::Lexer;
use crate::vm::call::CallStack;
use crate::vm::debug::trace_frames;
use crate::vm::labels::LabelGenerator;

pub struct Compiler<R, W> {
    lexer: Lexer<R>,
    emitter: Emitter<W>,
    stack: CallStack,
    labels: LabelGenerator,
}

fn required(found: bool) -> Result<()> {
    if found { Ok(()) } else { Err(VmError::Required) }
}

impl<R: BufRead, W: Write> Compiler<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            lexer: Lexer::new(input),
            emitter: Emitter::new(output),
            stack: CallStack::new(),
            labels: LabelGenerator::new(),
        }
    }

    /// Compiles one `.SYNTAX ... .END` grammar.
    pub fn compile(mut self) -> std::result::Result<(), RunError> {
        let matched = match self.program() {
            Ok(matched) => matched,
            Err(error) => return Err(self.fault(error).into()),
        };
        if !matched {
            return Err(RunError::Incomplete);
        }
        if let Err(error) = self.emitter.finish() {
            return Err(self.fault(error).into());
        }
        info!("grammar compiled");
        Ok(())
    }

    fn fault(&self, error: VmError) -> Fault {
        Fault::new(error, None, None, trace_frames(&self.stack, None))
    }

    // =========================================================
    // Rule plumbing
    // =========================================================

    /// Runs a rule inside its own frame; the frame is popped on every exit.
    fn scoped<T>(&mut self, rule: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.stack.push(None);
        let result = rule(self);
        self.stack.pop();
        result
    }

    fn emit(&mut self, s: &str) {
        self.emitter.write(s);
    }

    fn emit_line(&mut self, s: &str) -> Result<()> {
        self.emitter.write(s);
        self.emitter.flush_line()
    }

    fn copy_input(&mut self) {
        self.emitter.write(self.lexer.recall());
    }

    fn generate(&mut self, index: usize) -> Result<()> {
        let frame = self.stack.top_mut()?;
        let label = self.labels.generate(frame, index)?;
        self.emitter.write(&label);
        Ok(())
    }

    /// `.LABEL *1`
    fn label_gen1(&mut self) -> Result<()> {
        self.emitter.select_label_field()?;
        self.generate(1)?;
        self.emitter.flush_line()
    }

    /// `.OUT('<op> ' *1)`
    fn branch_gen1(&mut self, op: &str) -> Result<()> {
        self.emit(op);
        self.generate(1)?;
        self.emitter.flush_line()
    }

    // =========================================================
    // Rules
    // =========================================================

    fn program(&mut self) -> Result<bool> {
        self.scoped(|c| {
            if !c.lexer.literal(".SYNTAX")? {
                return Ok(false);
            }
            required(c.lexer.identifier()?)?;
            c.emit("B ");
            c.copy_input();
            c.emitter.flush_line()?;

            while c.statement()? {}

            required(c.lexer.literal(".END")?)?;
            c.emit_line("END")?;
            Ok(true)
        })
    }

    fn statement(&mut self) -> Result<bool> {
        self.scoped(|c| {
            if !c.lexer.identifier()? {
                return Ok(false);
            }
            c.emitter.select_label_field()?;
            c.copy_input();
            c.emitter.flush_line()?;

            required(c.lexer.literal("=")?)?;
            required(c.ex1()?)?;
            required(c.lexer.literal(";")?)?;
            c.emit_line("R")?;
            Ok(true)
        })
    }

    fn ex1(&mut self) -> Result<bool> {
        self.scoped(|c| {
            if !c.ex2()? {
                return Ok(false);
            }
            while c.lexer.literal("/")? {
                c.branch_gen1("BT ")?;
                required(c.ex2()?)?;
            }
            c.label_gen1()?;
            Ok(true)
        })
    }

    fn ex2(&mut self) -> Result<bool> {
        self.scoped(|c| {
            if c.ex3()? {
                c.branch_gen1("BF ")?;
            } else if !c.output()? {
                return Ok(false);
            }

            loop {
                if c.ex3()? {
                    c.emit_line("BE")?;
                } else if !c.output()? {
                    break;
                }
            }

            c.label_gen1()?;
            Ok(true)
        })
    }

    fn ex3(&mut self) -> Result<bool> {
        self.scoped(|c| {
            if c.lexer.identifier()? {
                c.emit("CLL ");
                c.copy_input();
                c.emitter.flush_line()?;
            } else if c.lexer.quoted_string()? {
                c.emit("TST ");
                c.copy_input();
                c.emitter.flush_line()?;
            } else if c.lexer.literal(".ID")? {
                c.emit_line("ID")?;
            } else if c.lexer.literal(".NUMBER")? {
                c.emit_line("NUM")?;
            } else if c.lexer.literal(".STRING")? {
                c.emit_line("SR")?;
            } else if c.lexer.literal("(")? {
                required(c.ex1()?)?;
                required(c.lexer.literal(")")?)?;
            } else if c.lexer.literal(".EMPTY")? {
                c.emit_line("SET")?;
            } else if c.lexer.literal("$")? {
                c.label_gen1()?;
                required(c.ex3()?)?;
                c.branch_gen1("BT ")?;
                c.emit_line("SET")?;
            } else {
                return Ok(false);
            }
            Ok(true)
        })
    }

    fn output(&mut self) -> Result<bool> {
        self.scoped(|c| {
            if c.lexer.literal(".OUT")? {
                required(c.lexer.literal("(")?)?;
                while c.out1()? {}
                required(c.lexer.literal(")")?)?;
            } else if c.lexer.literal(".LABEL")? {
                c.emit_line("LB")?;
                required(c.out1()?)?;
            } else {
                return Ok(false);
            }
            c.emit_line("OUT")?;
            Ok(true)
        })
    }

    fn out1(&mut self) -> Result<bool> {
        self.scoped(|c| {
            if c.lexer.literal("*1")? {
                c.emit_line("GN1")?;
            } else if c.lexer.literal("*2")? {
                c.emit_line("GN2")?;
            } else if c.lexer.literal("*")? {
                c.emit_line("CI")?;
            } else if c.lexer.quoted_string()? {
                c.emit("CL ");
                c.copy_input();
                c.emitter.flush_line()?;
            } else {
                return Ok(false);
            }
            Ok(true)
        })
    }
}
