//! Bytecode disassembler for debug output.

use crate::vm::chunk::Chunk;
use crate::vm::opcode::Op;
use crate::vm::value::Value;

/// Disassemble a whole chunk to a human-readable string.
pub fn disassemble(chunk: &Chunk, name: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("== {} ==\n", name));

    let mut offset = 0;
    while offset < chunk.code.len() {
        offset = disassemble_instruction(chunk, offset, &mut out);
        out.push('\n');
    }
    out
}

/// Disassemble the instruction at `offset` into `out`, returning the offset
/// of the next instruction. Walking a chunk with this visits every byte
/// exactly once.
pub fn disassemble_instruction(chunk: &Chunk, offset: usize, out: &mut String) -> usize {
    let line = chunk.lines.get(offset).copied().unwrap_or(0);
    let line_str = if offset > 0 && chunk.lines.get(offset - 1).copied() == Some(line) {
        "   |".to_string()
    } else {
        format!("{:4}", line)
    };
    out.push_str(&format!("{:04} {} ", offset, line_str));

    let byte = chunk.code[offset];
    let Some(op) = Op::from_u8(byte) else {
        out.push_str(&format!("UNKNOWN      {:>5}", byte));
        return offset + 1;
    };

    match op {
        Op::Constant => constant_instruction("CONSTANT", chunk, offset, out),
        Op::Nil => simple_instruction("NIL", offset, out),
        Op::True => simple_instruction("TRUE", offset, out),
        Op::False => simple_instruction("FALSE", offset, out),
        Op::Pop => simple_instruction("POP", offset, out),
        Op::GetLocal => byte_instruction("GET_LOCAL", chunk, offset, out),
        Op::SetLocal => byte_instruction("SET_LOCAL", chunk, offset, out),
        Op::GetGlobal => constant_instruction("GET_GLOBAL", chunk, offset, out),
        Op::DefineGlobal => constant_instruction("DEF_GLOBAL", chunk, offset, out),
        Op::SetGlobal => constant_instruction("SET_GLOBAL", chunk, offset, out),
        Op::Equal => simple_instruction("EQUAL", offset, out),
        Op::Greater => simple_instruction("GREATER", offset, out),
        Op::Less => simple_instruction("LESS", offset, out),
        Op::Add => simple_instruction("ADD", offset, out),
        Op::Subtract => simple_instruction("SUBTRACT", offset, out),
        Op::Multiply => simple_instruction("MULTIPLY", offset, out),
        Op::Divide => simple_instruction("DIVIDE", offset, out),
        Op::Not => simple_instruction("NOT", offset, out),
        Op::Negate => simple_instruction("NEGATE", offset, out),
        Op::Print => simple_instruction("PRINT", offset, out),
        Op::Jump => jump_instruction("JUMP", 1, chunk, offset, out),
        Op::JumpIfFalse => jump_instruction("JUMP_IF_FALSE", 1, chunk, offset, out),
        Op::Loop => jump_instruction("LOOP", -1, chunk, offset, out),
        Op::Return => simple_instruction("RETURN", offset, out),
    }
}

fn simple_instruction(name: &str, offset: usize, out: &mut String) -> usize {
    out.push_str(name);
    offset + 1
}

fn byte_instruction(name: &str, chunk: &Chunk, offset: usize, out: &mut String) -> usize {
    let slot = chunk.code[offset + 1];
    out.push_str(&format!("{:<13}{:>5}", name, slot));
    offset + 2
}

fn constant_instruction(name: &str, chunk: &Chunk, offset: usize, out: &mut String) -> usize {
    let idx = chunk.code[offset + 1];
    out.push_str(&format!(
        "{:<13}{:>5} ({})",
        name,
        idx,
        format_constant(chunk.constants.get(idx as usize))
    ));
    offset + 2
}

/// Jumps render their resolved target; `sign` is -1 for backward jumps.
fn jump_instruction(name: &str, sign: i64, chunk: &Chunk, offset: usize, out: &mut String) -> usize {
    let jump = ((chunk.code[offset + 1] as u16) << 8) | chunk.code[offset + 2] as u16;
    let target = offset as i64 + 3 + sign * jump as i64;
    out.push_str(&format!("{:<13}{:>5} -> {}", name, jump, target));
    offset + 3
}

fn format_constant(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => format!("\"{}\"", s),
        Some(v) => v.to_string(),
        None => "???".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::opcode::Op;

    fn sample_chunk() -> Chunk {
        let mut chunk = Chunk::new();
        let idx = chunk.add_constant(Value::Number(1.5)).unwrap();
        chunk.write_op(Op::Constant, 1);
        chunk.write(idx, 1);
        chunk.write_op(Op::Negate, 1);
        chunk.write_op(Op::Jump, 2);
        chunk.write(0x00, 2);
        chunk.write(0x03, 2);
        chunk.write_op(Op::Nil, 2);
        chunk.write_op(Op::Pop, 2);
        chunk.write_op(Op::Nil, 3);
        chunk.write_op(Op::Return, 3);
        chunk
    }

    #[test]
    fn test_walk_visits_every_byte_once() {
        let chunk = sample_chunk();
        let mut offset = 0;
        let mut out = String::new();
        let mut instructions = 0;
        while offset < chunk.code.len() {
            let next = disassemble_instruction(&chunk, offset, &mut out);
            assert!(next > offset);
            offset = next;
            instructions += 1;
        }
        assert_eq!(offset, chunk.code.len());
        assert_eq!(instructions, 7);
    }

    #[test]
    fn test_header_and_constant_rendering() {
        let chunk = sample_chunk();
        let text = disassemble(&chunk, "script");
        assert!(text.starts_with("== script ==\n"));
        assert!(text.contains("CONSTANT"));
        assert!(text.contains("(1.5)"));
    }

    #[test]
    fn test_repeated_lines_render_as_bars() {
        let chunk = sample_chunk();
        let text = disassemble(&chunk, "script");
        assert!(text.contains("   |"));
    }

    #[test]
    fn test_jump_targets() {
        let chunk = sample_chunk();
        let text = disassemble(&chunk, "script");
        // Jump at offset 3 with operand 3 lands just before the final Return.
        assert!(text.contains("JUMP") && text.contains("-> 9"));
    }
}
