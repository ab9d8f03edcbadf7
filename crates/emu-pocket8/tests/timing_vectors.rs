//! Instruction duration vectors.
//!
//! Each vector is a short program with its expected total duration in
//! ticks. The harness appends a HALT and counts tick calls until the
//! console goes idle: HALT parks the console two ticks into its own
//! cycle and the effect is observed one call later, so every program
//! halts after exactly `duration + 3` calls. An off-by-one anywhere in
//! a handler's schedule shows up as a wrong halt tick.

use serde::Deserialize;

use emu_pocket8::{Console, PROGRAM_BASE};

#[derive(Deserialize)]
struct Vector {
    name: String,
    program: Vec<u8>,
    duration: u64,
}

fn ticks_until_halt(program: &[u8]) -> u64 {
    let mut image = program.to_vec();
    image.push(0x76);

    let mut console = Console::new();
    console
        .load_rom(PROGRAM_BASE, &image)
        .expect("program fits in ROM");

    for calls in 1..=10_000 {
        console.tick().expect("tick");
        if console.is_halted() {
            return calls;
        }
    }
    panic!("program never halted");
}

static VECTORS: &str = r#"[
    { "name": "nop",                "program": [0],               "duration": 4 },
    { "name": "ld_bc_d16",          "program": [1, 18, 52],       "duration": 12 },
    { "name": "ld_sp_d16",          "program": [49, 15, 240],     "duration": 12 },
    { "name": "ld_bc_ind_a",        "program": [2],               "duration": 8 },
    { "name": "ld_a_bc_ind",        "program": [10],              "duration": 8 },
    { "name": "ld_hli_a",           "program": [34],              "duration": 8 },
    { "name": "inc_bc",             "program": [3],               "duration": 8 },
    { "name": "dec_bc",             "program": [11],              "duration": 8 },
    { "name": "add_hl_de",          "program": [25],              "duration": 8 },
    { "name": "inc_b",              "program": [4],               "duration": 4 },
    { "name": "inc_hl_mem",         "program": [52],              "duration": 12 },
    { "name": "ld_b_d8",            "program": [6, 66],           "duration": 8 },
    { "name": "ld_hl_mem_d8",       "program": [54, 85],          "duration": 12 },
    { "name": "rlca",               "program": [7],               "duration": 4 },
    { "name": "jr_taken",           "program": [24, 0],           "duration": 12 },
    { "name": "jr_z_not_taken",     "program": [40, 0],           "duration": 8 },
    { "name": "cpl",                "program": [47],              "duration": 4 },
    { "name": "ld_b_c",             "program": [65],              "duration": 4 },
    { "name": "ld_b_hl_mem",        "program": [70],              "duration": 8 },
    { "name": "add_a_b",            "program": [128],             "duration": 4 },
    { "name": "add_a_hl_mem",       "program": [134],             "duration": 8 },
    { "name": "add_d8",             "program": [198, 1],          "duration": 8 },
    { "name": "push_then_pop_bc",   "program": [197, 193],        "duration": 28 },
    { "name": "jp_taken",           "program": [195, 1, 3],       "duration": 16 },
    { "name": "jp_z_not_taken",     "program": [202, 1, 3],       "duration": 12 },
    { "name": "jp_hl",              "program": [33, 1, 4, 233],   "duration": 16 },
    { "name": "call_taken",         "program": [205, 1, 3],       "duration": 24 },
    { "name": "ret_z_not_taken",    "program": [200],             "duration": 8 },
    { "name": "cls",                "program": [211],             "duration": 16 },
    { "name": "spr",                "program": [244],             "duration": 16 },
    { "name": "ld_delay_a",         "program": [227],             "duration": 4 },
    { "name": "ld_a_keys",          "program": [236],             "duration": 4 },
    { "name": "cb_set_0_a",         "program": [203, 199],        "duration": 8 },
    { "name": "cb_rl_c",            "program": [203, 17],         "duration": 8 },
    { "name": "cb_bit_0_hl_mem",    "program": [203, 70],         "duration": 12 },
    { "name": "cb_sla_hl_mem",      "program": [203, 38],         "duration": 16 }
]"#;

#[test]
fn instruction_durations_match() {
    let vectors: Vec<Vector> = serde_json::from_str(VECTORS).expect("vector JSON parses");
    assert!(!vectors.is_empty());

    for vector in vectors {
        let calls = ticks_until_halt(&vector.program);
        assert_eq!(
            calls,
            vector.duration + 3,
            "{name}: expected {duration} ticks, halted after {calls} calls",
            name = vector.name,
            duration = vector.duration,
        );
    }
}
