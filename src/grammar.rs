// Instruction set of the META-II machine.
//
// program    ::= line*
// line       ::= label | ws+ opcode (ws+ operand)?
// label      ::= non-ws+            (binds to the ip of the next instruction)
// operand    ::= label-name | quoted-literal
//
// TST/CL carry a quoted literal, CLL/B/BT/BF carry a label name,
// everything else carries nothing.

use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Tst(String),
    Id,
    Num,
    Sr,
    Cll(String),
    R,
    Set,
    B(String),
    Bt(String),
    Bf(String),
    Be,
    Cl(String),
    Ci,
    Gn1,
    Gn2,
    Lb,
    Out,
    End,
}

/// Result of decoding an opcode mnemonic against its operand.
pub(crate) enum Decoded {
    Ok(Instruction),
    Unknown,
    MissingOperand,
    UnexpectedOperand,
}

impl Instruction {
    pub(crate) fn decode(opcode: &str, operand: Option<&str>) -> Decoded {
        let with_operand = |make: fn(String) -> Instruction| match operand {
            Some(op) => Decoded::Ok(make(op.to_string())),
            None => Decoded::MissingOperand,
        };
        let bare = |instr: Instruction| match operand {
            Some(_) => Decoded::UnexpectedOperand,
            None => Decoded::Ok(instr),
        };

        match opcode {
            "TST" => with_operand(Instruction::Tst),
            "CLL" => with_operand(Instruction::Cll),
            "B" => with_operand(Instruction::B),
            "BT" => with_operand(Instruction::Bt),
            "BF" => with_operand(Instruction::Bf),
            "CL" => with_operand(Instruction::Cl),
            "ID" => bare(Instruction::Id),
            "NUM" => bare(Instruction::Num),
            "SR" => bare(Instruction::Sr),
            "R" => bare(Instruction::R),
            "SET" => bare(Instruction::Set),
            "BE" => bare(Instruction::Be),
            "CI" => bare(Instruction::Ci),
            "GN1" => bare(Instruction::Gn1),
            "GN2" => bare(Instruction::Gn2),
            "LB" => bare(Instruction::Lb),
            "OUT" => bare(Instruction::Out),
            "END" => bare(Instruction::End),
            _ => Decoded::Unknown,
        }
    }

    pub fn opcode(&self) -> &'static str {
        match self {
            Instruction::Tst(_) => "TST",
            Instruction::Id => "ID",
            Instruction::Num => "NUM",
            Instruction::Sr => "SR",
            Instruction::Cll(_) => "CLL",
            Instruction::R => "R",
            Instruction::Set => "SET",
            Instruction::B(_) => "B",
            Instruction::Bt(_) => "BT",
            Instruction::Bf(_) => "BF",
            Instruction::Be => "BE",
            Instruction::Cl(_) => "CL",
            Instruction::Ci => "CI",
            Instruction::Gn1 => "GN1",
            Instruction::Gn2 => "GN2",
            Instruction::Lb => "LB",
            Instruction::Out => "OUT",
            Instruction::End => "END",
        }
    }

    pub fn operand(&self) -> Option<&str> {
        match self {
            Instruction::Tst(s)
            | Instruction::Cll(s)
            | Instruction::B(s)
            | Instruction::Bt(s)
            | Instruction::Bf(s)
            | Instruction::Cl(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand() {
            Some(operand) => write!(f, "{} {}", self.opcode(), operand),
            None => f.write_str(self.opcode()),
        }
    }
}

/// Strips one pair of surrounding quotes from a literal operand.
pub fn unquote(literal: &str) -> &str {
    let mut chars = literal.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open), Some(close)) if open == close && (open == '\'' || open == '"') => {
            &literal[1..literal.len() - 1]
        }
        _ => literal,
    }
}

/// A loaded program: instructions, label table and the ip -> source line map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    pub labels: HashMap<String, usize>,
    pub lines: HashMap<usize, usize>,
}

impl Program {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, ip: usize) -> Option<&Instruction> {
        self.instructions.get(ip)
    }

    pub fn resolve(&self, label: &str) -> Option<usize> {
        self.labels.get(label).copied()
    }

    pub fn line_of(&self, ip: usize) -> Option<usize> {
        self.lines.get(&ip).copied()
    }

    fn sorted_labels(&self) -> Vec<(&str, usize)> {
        let mut labels: Vec<_> = self.labels.iter().map(|(n, ip)| (n.as_str(), *ip)).collect();
        labels.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(b.0)));
        labels
    }

    /// Renders the program back into loadable assembly text.
    pub fn to_assembly(&self) -> String {
        let labels = self.sorted_labels();
        let mut pending = labels.iter().peekable();
        let mut text = String::new();

        for (ip, instr) in self.instructions.iter().enumerate() {
            while let Some((name, _)) = pending.next_if(|(_, at)| *at == ip) {
                text.push_str(name);
                text.push('\n');
            }
            let indent = crate::emitter::PROGRAM_INDENT;
            text.push_str(&format!("{:indent$}{}\n", "", instr));
        }
        for (name, _) in pending {
            text.push_str(name);
            text.push('\n');
        }
        text
    }

    /// Debug dump: every instruction by ip, then every label with its target.
    pub fn listing(&self) -> String {
        let mut text = String::new();
        for (ip, instr) in self.instructions.iter().enumerate() {
            text.push_str(&format!("{ip}:{instr}\n"));
        }
        for (name, ip) in self.sorted_labels() {
            match self.get(ip) {
                Some(instr) => text.push_str(&format!("{name}->{ip}:{instr}\n")),
                None => text.push_str(&format!("{name}->{ip}:?\n")),
            }
        }
        text
    }
}
