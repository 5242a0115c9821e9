//! Assembling programs from files.

use std::io::Write;

use ooosim_core::config::Config;
use ooosim_core::isa::asm::{self, AsmError};
use ooosim_core::isa::{Opcode, Program};
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

use crate::common::TestContext;

fn write_program(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn test_parse_file_and_run() {
    let file = write_program(
        "# factorial of 5
                 ADDI R1, R0, 5
                 ADDI R2, R0, 1
         loop:   MULT R2, R2, R1   ; accumulate
                 SUBI R1, R1, 1
                 BGTZ R1, loop
                 SW   R2, 0x10 (R0)
                 EOP
        ",
    );
    let program = asm::parse_file(file.path()).unwrap();
    assert_eq!(program.len(), 7);
    assert_eq!(program.instructions()[4].opcode, Opcode::Bgtz);
    assert_eq!(program.instructions()[4].imm, -12);

    let mut ctx = TestContext::new(&program, Config::default());
    let _ = ctx.run_to_end();
    assert_eq!(ctx.reg(2), 120);
    assert_eq!(ctx.sim.read_memory(0x10).unwrap(), 120);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = asm::parse_file(dir.path().join("absent.s")).unwrap_err();
    assert!(matches!(err, AsmError::Io { .. }));
}

#[test]
fn test_errors_report_line() {
    let file = write_program("ADDI R1 R0 1\nFROB R1\n");
    match asm::parse_file(file.path()) {
        Err(AsmError::UnknownOpcode { line, token }) => {
            assert_eq!(line, 2);
            assert_eq!(token, "FROB");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_forward_and_backward_labels_agree_with_builder() {
    let parsed = asm::parse(
        "top:  BEQZ R1 end
               JUMP top
         end:  EOP",
    )
    .unwrap();
    let built: Program = crate::common::ProgramBuilder::new()
        .branch(Opcode::Beqz, crate::common::builder::r(1), 2)
        .jump(0)
        .eop()
        .build();
    assert_eq!(parsed.instructions(), built.instructions());
}
