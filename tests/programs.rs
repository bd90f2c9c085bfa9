use std::{fs, path::PathBuf};

use chipvm::{
    display::WIDTH,
    memory::{FONT, PROGRAM_CAPACITY},
    Emulator, LoadError,
};
use rand::{rngs::StdRng, SeedableRng};

fn emulator() -> Emulator {
    Emulator::with_rng(StdRng::seed_from_u64(0))
}

fn scratch_file(name: &str, contents: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("chipvm-{}-{name}", std::process::id()));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn construction() {
    let emu = emulator();
    assert_eq!(&emu.memory()[..80], &FONT[..]);
    assert!(emu.memory()[80..].iter().all(|&b| b == 0));
    assert_eq!(emu.pc(), 512);
    assert_eq!(emu.index(), 0);
    assert_eq!(emu.stack_pointer(), 0);
    assert_eq!((emu.delay_timer(), emu.sound_timer()), (0, 0));
    assert!(emu.registers().iter().all(|&r| r == 0));
    assert_eq!(emu.frame_buffer().len(), 64 * 32);
    assert!(emu.frame_buffer().iter().all(|&p| p == 0));
}

#[test]
fn load_from_file() {
    let path = scratch_file("ok.ch8", &[0x60, 0x0A, 0x70, 0x05]);
    let mut emu = emulator();
    emu.load_program_file(&path).unwrap();
    fs::remove_file(&path).unwrap();

    emu.step().unwrap();
    emu.step().unwrap();
    assert_eq!(emu.register(0), 15);
    assert_eq!(emu.pc(), 512 + 4);
}

#[test]
fn load_capacity_boundary() {
    let exact = scratch_file("exact.ch8", &vec![0x12; PROGRAM_CAPACITY]);
    let over = scratch_file("over.ch8", &vec![0x12; PROGRAM_CAPACITY + 1]);

    let mut emu = emulator();
    let err = emu.load_program_file(&over).unwrap_err();
    assert!(matches!(err, LoadError::TooLarge { size, max } if size == 3585 && max == 3584));
    assert_eq!(&emu.memory()[..80], &FONT[..]);
    assert!(emu.memory()[80..].iter().all(|&b| b == 0));

    emu.load_program_file(&exact).unwrap();
    assert!(emu.memory()[512..].iter().all(|&b| b == 0x12));
    assert_eq!(emu.pc(), 512);

    fs::remove_file(exact).unwrap();
    fs::remove_file(over).unwrap();
}

#[test]
fn load_missing_file() {
    let mut emu = emulator();
    let err = emu
        .load_program_file(std::env::temp_dir().join("chipvm-no-such-program.ch8"))
        .unwrap_err();
    assert!(matches!(err, LoadError::NotFound { .. }));
    assert!(err.to_string().contains("chipvm-no-such-program.ch8"));
    assert!(emu.memory()[80..].iter().all(|&b| b == 0));
}

#[test]
fn load_from_reader() {
    let mut emu = emulator();
    emu.load_program_from(&[0x00u8, 0xE0][..]).unwrap();
    assert_eq!(&emu.memory()[512..514], &[0x00, 0xE0]);
}

#[test]
fn subroutine_round_trip() {
    let mut program = vec![0u8; 0x102];
    program[..4].copy_from_slice(&[0x23, 0x00, 0x61, 0x01]);
    program[0x100..].copy_from_slice(&[0x00, 0xEE]);
    let mut emu = emulator();
    emu.load_program(&program).unwrap();

    emu.step().unwrap();
    emu.step().unwrap();
    assert_eq!(emu.pc(), 0x202);
    emu.step().unwrap();
    assert_eq!(emu.register(1), 1);
}

#[test]
fn draw_glyph_then_clear() {
    // V0 = 7, I = glyph 7, draw at (V1, V1) = (0, 0), draw again, draw, clear
    let mut emu = emulator();
    emu.load_program(&[
        0x60, 0x07, 0xF0, 0x29, 0xD1, 0x15, 0xD1, 0x15, 0xD1, 0x15, 0x00, 0xE0,
    ])
    .unwrap();

    emu.step().unwrap();
    emu.step().unwrap();
    assert_eq!(emu.index(), 35);

    emu.step().unwrap();
    let first = emu.frame_buffer().to_vec();
    assert_eq!(&first[..4], &[1, 1, 1, 1]);
    assert_eq!(first[WIDTH + 3], 1);
    assert_eq!(emu.register(0xF), 0);
    assert!(emu.redraw());

    emu.step().unwrap();
    assert_eq!(emu.register(0xF), 1);
    assert!(emu.frame_buffer().iter().all(|&p| p == 0));

    emu.step().unwrap();
    assert_eq!(emu.frame_buffer(), &first[..]);

    emu.step().unwrap();
    assert!(emu.redraw());
    assert!(emu.frame_buffer().iter().all(|&p| p == 0));
}

#[test]
fn countdown_loop() {
    // V0 = 3; loop: V0 -= 1 (add 0xFF); if V0 != 0 jump back
    let mut emu = emulator();
    emu.load_program(&[0x60, 0x03, 0x70, 0xFF, 0x30, 0x00, 0x12, 0x02, 0x12, 0x08])
        .unwrap();
    for _ in 0..16 {
        emu.step().unwrap();
    }
    assert_eq!(emu.register(0), 0);
    assert_eq!(emu.pc(), 0x208);
}
