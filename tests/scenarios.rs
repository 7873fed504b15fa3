//! End-to-end scenarios assembling complete source strings and checking the
//! emitted bytes, mirroring the design doc's worked examples.

use std::rc::Rc;

use tiny6502::cpu::Cpu;
use tiny6502::diagnostics::Diagnostics;
use tiny6502::pass;
use tiny6502::source::SourceFile;

fn assemble(src: &str, cpu: Cpu) -> (Vec<u8>, Diagnostics, u32) {
    let file = Rc::new(SourceFile::new("t.s", src));
    let mut diags = Diagnostics::new();
    let result = pass::assemble(file, cpu, false, &mut diags);
    let bytes = result.context.output.bytes_written().to_vec();
    (bytes, diags, result.passes_run)
}

#[test]
fn forward_reference_needs_a_second_pass() {
    let src = "    lda target\n    nop\ntarget = $1234\n";
    let (bytes, diags, passes) = assemble(src, Cpu::Nmos6502);
    assert!(!diags.has_errors(), "unexpected errors: {:?}", diags.entries());
    assert_eq!(bytes, vec![0xad, 0x34, 0x12, 0xea]);
    assert_eq!(passes, 2);
}

#[test]
fn anonymous_backward_label_encodes_a_short_branch() {
    let src = "-   inx\n    bne -\n";
    let (bytes, diags, _) = assemble(src, Cpu::Nmos6502);
    assert!(!diags.has_errors(), "unexpected errors: {:?}", diags.entries());
    assert_eq!(bytes, vec![0xe8, 0xd0, 0xfd]);
}

#[test]
fn m16_m8_directives_change_immediate_operand_width() {
    let src = ".m16\nlda #$1234\n.m8\nlda #$12\n";
    let (bytes, diags, _) = assemble(src, Cpu::Wdc65816);
    assert!(!diags.has_errors(), "unexpected errors: {:?}", diags.entries());
    assert_eq!(bytes, vec![0xa9, 0x34, 0x12, 0xa9, 0x12]);
}

#[test]
fn pstring_emits_a_length_prefix() {
    let src = ".pstring \"hi\"\n";
    let (bytes, diags, _) = assemble(src, Cpu::Nmos6502);
    assert!(!diags.has_errors(), "unexpected errors: {:?}", diags.entries());
    assert_eq!(bytes, vec![0x02, b'h', b'i']);
}

#[test]
fn binary_directive_honors_offset_and_count() {
    let path = std::env::temp_dir().join("tiny6502-scenario-binary.bin");
    std::fs::write(&path, [0x00u8, 0x01, 0x02, 0x03, 0x04, 0x05]).unwrap();

    let src = format!(".binary \"{}\", 2, 3\n", path.to_string_lossy().replace('\\', "/"));
    let (bytes, diags, _) = assemble(&src, Cpu::Nmos6502);
    std::fs::remove_file(&path).ok();

    assert!(!diags.has_errors(), "unexpected errors: {:?}", diags.entries());
    assert_eq!(bytes, vec![0x02, 0x03, 0x04]);
}

#[test]
fn duplicate_label_definition_is_reported_as_an_error() {
    let src = "foo: nop\nfoo: nop\n";
    let (_, diags, _) = assemble(src, Cpu::Nmos6502);
    assert!(diags.has_errors());
}

#[test]
fn pc_assign_relocates_logical_addressing() {
    let src = "* = $c000\nstart: nop\n";
    let (bytes, diags, _) = assemble(src, Cpu::Nmos6502);
    assert!(!diags.has_errors(), "unexpected errors: {:?}", diags.entries());
    assert_eq!(bytes, vec![0xea]);
}

#[test]
fn bra_out_of_short_range_promotes_to_a_long_branch() {
    let src = "* = $8000\nbra target\n* = $9000\ntarget: nop\n";
    let (bytes, diags, _) = assemble(src, Cpu::Wdc65816);
    assert!(!diags.has_errors(), "unexpected errors: {:?}", diags.entries());
    assert_eq!(bytes[0], 0x82);
    assert_eq!(bytes.len(), 4);
    assert_eq!(*bytes.last().unwrap(), 0xea);
}
