//! Whole-console instruction tests: load a program, tick, observe.

use emu_core::{Tickable, Ticks};
use emu_pocket8::flags::{CF, HF, NF, ZF};
use emu_pocket8::{Console, Error, PROGRAM_BASE, STACK_TOP};

fn boot(program: &[u8]) -> Console {
    let mut console = Console::new();
    console
        .load_rom(PROGRAM_BASE, program)
        .expect("program fits in ROM");
    console
}

fn run_ticks(console: &mut Console, n: u64) {
    for _ in 0..n {
        console.tick().expect("tick");
    }
}

fn run_until_halt(console: &mut Console) {
    for _ in 0..100_000 {
        console.tick().expect("tick");
        if console.is_halted() {
            return;
        }
    }
    panic!("program never halted");
}

/// Run until the first error surfaces and return it.
fn run_until_error(console: &mut Console) -> Error {
    for _ in 0..100_000 {
        if let Err(err) = console.tick() {
            return err;
        }
    }
    panic!("program never errored");
}

#[test]
fn ld_pair_immediate_lands_on_schedule() {
    // LD BC,d16 takes twelve ticks; the high immediate byte arrives in
    // B four ticks before the low byte arrives in C.
    let mut console = boot(&[0x01, 50, 45]);

    run_ticks(&mut console, 10);
    assert_eq!(console.registers().b, 50);
    assert_eq!(console.registers().c, 0);

    run_ticks(&mut console, 2);
    assert_eq!(console.registers().b, 50);
    assert_eq!(console.registers().c, 45);
    assert_eq!(console.pc(), 0x103);
    assert_eq!(console.total_ticks(), Ticks::new(12));
}

#[test]
fn ld_immediate_writes_on_its_exact_tick() {
    let mut console = boot(&[0x06, 0x42]);

    run_ticks(&mut console, 6);
    assert_eq!(console.registers().b, 0);
    run_ticks(&mut console, 1);
    assert_eq!(console.registers().b, 0x42);
}

#[test]
fn add_immediate() {
    let mut console = boot(&[0x3E, 100, 0xC6, 11, 0x76]);
    run_until_halt(&mut console);

    assert_eq!(console.registers().a, 111);
    assert_eq!(console.registers().f, 0);
}

#[test]
fn compare_sets_borrow_flags_and_keeps_a() {
    let mut console = boot(&[0x3E, 0x10, 0xFE, 0x20, 0x76]);
    run_until_halt(&mut console);

    assert_eq!(console.registers().a, 0x10);
    assert_eq!(console.registers().f, NF | CF);
}

#[test]
fn call_and_return_through_the_hardware_stack() {
    // 0x100: CALL 0x110; HALT. 0x110: LD A,7; RET.
    let mut program = vec![0xCD, 0x01, 0x10, 0x76];
    program.resize(0x10, 0x00);
    program.extend([0x3E, 7, 0xC9]);
    let mut console = boot(&program);

    run_until_halt(&mut console);
    assert_eq!(console.registers().a, 7);
    assert_eq!(console.call_depth(), 0);
    assert_eq!(console.pc(), 0x104);
}

#[test]
fn push_pop_round_trip_through_memory() {
    // LD BC,0x1234; PUSH BC; LD DE,0; POP DE; HALT.
    let mut console = boot(&[0x01, 0x12, 0x34, 0xC5, 0x11, 0x00, 0x00, 0xD1, 0x76]);
    run_until_halt(&mut console);

    assert_eq!(console.registers().de(), 0x1234);
    assert_eq!(console.registers().sp, STACK_TOP);
}

#[test]
fn relative_jump_taken_skips_ahead() {
    // XOR A sets Z; JR Z,+1 hops over INC A.
    let mut console = boot(&[0xAF, 0x28, 0x01, 0x3C, 0x76]);
    run_until_halt(&mut console);

    assert_eq!(console.registers().a, 0);
    assert_eq!(console.pc(), 0x105);
}

#[test]
fn relative_jump_not_taken_falls_through() {
    // INC A clears Z; JR Z never fires.
    let mut console = boot(&[0x3C, 0x28, 0x05, 0x76]);
    run_until_halt(&mut console);

    assert_eq!(console.registers().a, 1);
    assert_eq!(console.pc(), 0x104);
}

#[test]
fn jump_through_hl() {
    let mut console = boot(&[0x21, 0x01, 0x08, 0xE9, 0x00, 0x00, 0x00, 0x00, 0x76]);
    run_until_halt(&mut console);
    assert_eq!(console.pc(), 0x109);
}

#[test]
fn extended_table_set_and_bit() {
    // SET 0,A; then BIT 1,A on the result.
    let mut console = boot(&[0xCB, 0xC7, 0xCB, 0x4F, 0x76]);
    run_until_halt(&mut console);

    assert_eq!(console.registers().a, 1);
    // Bit 1 is clear: Z set, H always set, N cleared.
    assert_eq!(console.registers().f, ZF | HF);
}

#[test]
fn memory_read_modify_write_through_hl() {
    // LD HL,0x800; LD (HL),5; INC (HL); LD A,(HL); HALT.
    let mut console = boot(&[0x21, 0x08, 0x00, 0x36, 5, 0x34, 0x7E, 0x76]);
    run_until_halt(&mut console);
    assert_eq!(console.registers().a, 6);
}

#[test]
fn post_increment_store_steps_hl_after_the_write() {
    // LD HL,0x800; LD A,0xAA; LD (HL+),A; DEC HL; XOR A; LD A,(HL).
    let mut console = boot(&[0x21, 0x08, 0x00, 0x3E, 0xAA, 0x22, 0x2B, 0xAF, 0x7E, 0x76]);
    run_until_halt(&mut console);

    assert_eq!(console.registers().a, 0xAA);
    assert_eq!(console.registers().hl(), 0x800);
}

#[test]
fn rom_writes_are_discarded() {
    // LD BC,0x100; LD A,0x99; LD (BC),A; LD A,(BC): the store into mask
    // ROM vanishes and the read returns the original opcode byte.
    let mut console = boot(&[0x01, 0x01, 0x00, 0x3E, 0x99, 0x02, 0x0A, 0x76]);
    run_until_halt(&mut console);
    assert_eq!(console.registers().a, 0x01);
}

#[test]
fn clear_display_zeroes_the_framebuffer() {
    let mut console = boot(&[0xD3, 0x76]);
    console.framebuffer_mut().fill();

    run_until_halt(&mut console);
    for y in 0..emu_pocket8::HEIGHT {
        assert_eq!(console.framebuffer().row(y), 0);
    }
}

#[test]
fn sprite_redraw_collides_and_erases() {
    // LD A,0xFF; LD BC,0 (column 0, row 0); SPR; SPR.
    let mut console = boot(&[0x3E, 0xFF, 0x01, 0x00, 0x00, 0xF4, 0xF4, 0x76]);
    run_until_halt(&mut console);

    assert_eq!(console.registers().f & CF, CF);
    assert_eq!(console.framebuffer().row(0), 0);
}

#[test]
fn timers_and_keypad_instructions() {
    // LD A,3; LD DELAY,A; LD SOUND,A; LD A,KEYS; HALT.
    let mut console = boot(&[0x3E, 3, 0xE3, 0xE4, 0xEC, 0x76]);
    console.set_keys(0b0000_0101);
    run_until_halt(&mut console);

    assert_eq!(console.registers().a, 0b0000_0101);
    assert_eq!(console.delay(), 3);
    assert_eq!(console.sound(), 3);

    // The 60 Hz domain advances independently of instruction ticks.
    console.timers_mut().tick_n(Ticks::new(2));
    assert_eq!(console.delay(), 1);
    assert_eq!(console.sound(), 1);
    console.timers_mut().tick_n(Ticks::new(5));
    assert_eq!(console.delay(), 0);
}

#[test]
fn runaway_recursion_overflows_the_call_stack() {
    let mut console = Console::new();
    // RST 0x08 at the program base; the vector itself is RST 0x08.
    console.load_rom(0x008, &[0xCF]).expect("fits");
    console.load_rom(PROGRAM_BASE, &[0xCF]).expect("fits");

    let err = run_until_error(&mut console);
    assert_eq!(err, Error::StackOverflow);
    assert_eq!(console.call_depth(), 16);
}

#[test]
fn return_on_empty_stack_underflows() {
    let mut console = boot(&[0xC9]);

    let err = run_until_error(&mut console);
    assert_eq!(err, Error::StackUnderflow);
    // The failed instruction left PC past its own opcode and nothing
    // else disturbed.
    assert_eq!(console.pc(), 0x101);
    assert_eq!(console.call_depth(), 0);
}

#[test]
fn error_then_resume_continues_at_pc() {
    let mut console = boot(&[0xC9, 0x3E, 0x42, 0x76]);

    assert_eq!(run_until_error(&mut console), Error::StackUnderflow);
    // PC already points at the next byte; resuming runs the rest.
    console.resume();
    run_until_halt(&mut console);
    assert_eq!(console.registers().a, 0x42);
}
