//! Compiled program chunk.
//!
//! A `ZrChunk` holds a flat `u32` instruction stream, the constant pool it
//! indexes, and a table binding label names to instruction indices.

use std::fmt::Write;

use rustc_hash::FxHashMap;

use super::{Constant, ConstantPool, OpCode};

/// A compiled program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZrChunk {
    /// Opcode and operand words.
    instructions: Vec<u32>,
    /// Source line per word, empty for decoded chunks.
    lines: Vec<u32>,
    constants: ConstantPool,
    /// `(instruction index, name)` in the order they were bound.
    labels: Vec<(usize, String)>,
}

impl ZrChunk {
    /// Create a new empty chunk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a chunk from decoded parts.
    pub fn from_parts(instructions: Vec<u32>, constants: ConstantPool, labels: Vec<(usize, String)>) -> Self {
        Self {
            instructions,
            lines: Vec::new(),
            constants,
            labels,
        }
    }

    /// Write an opcode word.
    pub fn write_op(&mut self, op: OpCode, line: u32) {
        self.instructions.push(op.word());
        self.lines.push(line);
    }

    /// Write an operand word.
    pub fn write_operand(&mut self, operand: u32, line: u32) {
        self.instructions.push(operand);
        self.lines.push(line);
    }

    /// Bind `name` to the next instruction index.
    pub fn add_label(&mut self, name: impl Into<String>) {
        self.labels.push((self.instructions.len(), name.into()));
    }

    /// The instruction index bound to `name`; the last binding wins.
    pub fn label_index(&self, name: &str) -> Option<usize> {
        self.labels
            .iter()
            .rev()
            .find(|(_, label)| label == name)
            .map(|(index, _)| *index)
    }

    /// Label names mapped to instruction indices, built once per run.
    pub fn label_table(&self) -> FxHashMap<&str, usize> {
        self.labels
            .iter()
            .map(|(index, name)| (name.as_str(), *index))
            .collect()
    }

    pub fn instructions(&self) -> &[u32] {
        &self.instructions
    }

    pub fn constants(&self) -> &ConstantPool {
        &self.constants
    }

    pub fn constants_mut(&mut self) -> &mut ConstantPool {
        &mut self.constants
    }

    pub fn labels(&self) -> &[(usize, String)] {
        &self.labels
    }

    /// Get the line number for a given word.
    pub fn line_at(&self, ip: usize) -> Option<u32> {
        self.lines.get(ip).copied()
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn read_word(&self, ip: usize) -> Option<u32> {
        self.instructions.get(ip).copied()
    }

    pub fn read_op(&self, ip: usize) -> Option<OpCode> {
        self.read_word(ip).and_then(OpCode::from_word)
    }

    /// Extract all opcodes from the chunk, skipping operands.
    pub fn opcodes(&self) -> Vec<OpCode> {
        let mut ops = Vec::new();
        let mut ip = 0;

        while ip < self.instructions.len() {
            if let Some(op) = self.read_op(ip) {
                ops.push(op);
                ip += 1 + op.arity();
            } else {
                ip += 1;
            }
        }

        ops
    }

    /// Check if this chunk contains exactly the given opcode sequence.
    ///
    /// Panics with a descriptive message if the sequences don't match.
    #[track_caller]
    pub fn assert_opcodes(&self, expected: &[OpCode]) {
        let actual = self.opcodes();
        assert_eq!(
            actual,
            expected,
            "Bytecode mismatch.\nExpected: {:?}\nActual:   {:?}",
            expected.iter().map(|op| op.name()).collect::<Vec<_>>(),
            actual.iter().map(|op| op.name()).collect::<Vec<_>>(),
        );
    }

    /// Check if this chunk contains the given opcodes in order, not
    /// necessarily contiguous.
    #[track_caller]
    pub fn assert_contains_opcodes(&self, expected: &[OpCode]) {
        let actual = self.opcodes();
        let mut expected_iter = expected.iter().peekable();

        for op in &actual {
            if expected_iter.peek() == Some(&op) {
                expected_iter.next();
            }
        }

        if expected_iter.peek().is_some() {
            let remaining: Vec<_> = expected_iter.map(|op| op.name()).collect();
            panic!(
                "Missing opcodes in sequence.\nExpected to find: {:?}\nActual bytecode:  {:?}",
                remaining,
                actual.iter().map(|op| op.name()).collect::<Vec<_>>(),
            );
        }
    }

    /// Human-readable listing with label markers and constant comments.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        let mut ip = 0;

        while ip < self.instructions.len() {
            for (_, name) in self.labels.iter().filter(|(index, _)| *index == ip) {
                let _ = writeln!(out, "{}:", name);
            }

            let word = self.instructions[ip];
            let Some(op) = OpCode::from_word(word) else {
                let _ = writeln!(out, "{:04}  <invalid {}>", ip, word);
                ip += 1;
                continue;
            };

            let operands = self.instructions.get(ip + 1..ip + 1 + op.arity());
            let mut line = format!("{:04}  {:<12}", ip, op.name());
            match operands {
                Some(operands) => {
                    let rendered: Vec<String> = operands.iter().map(u32::to_string).collect();
                    line.push_str(&rendered.join(" "));
                    let constant = operands.first().and_then(|&k| self.constants.get(k));
                    if let (true, Some(constant)) = (op.takes_constant(), constant) {
                        let _ = write!(line, "  ; {}", constant);
                    }
                }
                None => line.push_str("<truncated>"),
            }
            let _ = writeln!(out, "{}", line.trim_end());
            ip += 1 + op.arity();
        }

        for (_, name) in self.labels.iter().filter(|(index, _)| *index >= self.instructions.len()) {
            let _ = writeln!(out, "{}:", name);
        }
        out
    }

    /// The string constant at `index`.
    pub fn string_constant(&self, index: u32) -> Option<&str> {
        self.constants.get(index).and_then(Constant::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ZrChunk {
        let mut chunk = ZrChunk::new();
        let ten = chunk.constants_mut().add_number(10.0);
        let x = chunk.constants_mut().add_string("x");
        chunk.add_label("@start");
        chunk.write_op(OpCode::LoadK, 1);
        chunk.write_operand(ten, 1);
        chunk.write_op(OpCode::SetUpvalue, 1);
        chunk.write_operand(x, 1);
        chunk.write_op(OpCode::LoadNone, 2);
        chunk
    }

    #[test]
    fn new_chunk_is_empty() {
        let chunk = ZrChunk::new();
        assert!(chunk.is_empty());
        assert_eq!(chunk.len(), 0);
    }

    #[test]
    fn write_and_read() {
        let chunk = sample();
        assert_eq!(chunk.len(), 5);
        assert_eq!(chunk.read_op(0), Some(OpCode::LoadK));
        assert_eq!(chunk.read_word(1), Some(0));
        assert_eq!(chunk.line_at(4), Some(2));
        assert_eq!(chunk.string_constant(1), Some("x"));
    }

    #[test]
    fn opcodes_skip_operands() {
        sample().assert_opcodes(&[OpCode::LoadK, OpCode::SetUpvalue, OpCode::LoadNone]);
    }

    #[test]
    fn contains_opcodes_in_order() {
        sample().assert_contains_opcodes(&[OpCode::LoadK, OpCode::LoadNone]);
    }

    #[test]
    #[should_panic(expected = "Bytecode mismatch")]
    fn assert_opcodes_failure() {
        sample().assert_opcodes(&[OpCode::Add]);
    }

    #[test]
    #[should_panic(expected = "Missing opcodes")]
    fn assert_contains_opcodes_failure() {
        sample().assert_contains_opcodes(&[OpCode::LoadNone, OpCode::LoadK]);
    }

    #[test]
    fn later_label_wins() {
        let mut chunk = ZrChunk::new();
        chunk.add_label("f");
        chunk.write_op(OpCode::LoadNone, 1);
        chunk.add_label("f");
        assert_eq!(chunk.label_index("f"), Some(1));
        assert_eq!(chunk.label_table().get("f"), Some(&1));
        assert_eq!(chunk.label_index("g"), None);
    }

    #[test]
    fn disassembly_lists_labels_and_constants() {
        let text = sample().disassemble();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "@start:");
        assert_eq!(lines[1], "0000  LOADK       0  ; 10");
        assert_eq!(lines[2], "0002  SETUPVALUE  1  ; \"x\"");
        assert_eq!(lines[3], "0004  LOADNONE");
    }

    #[test]
    fn disassembly_flags_bad_words() {
        let chunk = ZrChunk::from_parts(vec![99, OpCode::LoadK.word()], ConstantPool::new(), Vec::new());
        let text = chunk.disassemble();
        assert!(text.contains("<invalid 99>"));
        assert!(text.contains("<truncated>"));
    }
}
