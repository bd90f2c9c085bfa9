use std::{io::Read, path::Path};

use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

use crate::{
    decode::OpCodes,
    display::FrameBuffer,
    error::{Anomaly, LoadError},
    keyboard::Keyboard,
    memory::{Memory, TypeAddr, GLYPH_SIZE},
    registers::{Registers, FLAG},
};

/// Behaviour switches where interpreters historically disagree. `Default` is the reference
/// behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quirks {
    /// FX0A also stores the lowest pressed key index in VX once it is satisfied.
    pub capture_key_on_wait: bool,
}

/// The whole machine. One `step` is one fetch-decode-execute-timer cycle.
///
/// Randomness for CXNN comes from the injected `R`, so seeding it makes runs repeatable.
pub struct Emulator<R = StdRng> {
    fb: FrameBuffer,
    regs: Registers,
    mem: Memory,
    keys: Keyboard,
    delay_timer: u8,
    sound_timer: u8,
    redraw: bool,
    // register FX0A is parked on
    awaiting_key: Option<u8>,
    quirks: Quirks,
    rng: R,
}

impl Emulator<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Default for Emulator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore> Emulator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            fb: FrameBuffer::new(),
            regs: Registers::new(),
            mem: Memory::new(),
            keys: Keyboard::new(),
            delay_timer: 0,
            sound_timer: 0,
            redraw: false,
            awaiting_key: None,
            quirks: Quirks::default(),
            rng,
        }
    }

    pub fn with_quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = quirks;
        self
    }

    pub fn load_program(&mut self, program: &[u8]) -> Result<(), LoadError> {
        self.mem.load_rom(program)
    }

    pub fn load_program_from(&mut self, reader: impl Read) -> Result<(), LoadError> {
        self.mem.load_rom_from(reader)
    }

    pub fn load_program_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        self.mem.load_rom_by_file(path)
    }

    /// Runs one cycle. An `Err` is informational: pc has still moved on and the timers have
    /// still decayed.
    pub fn step(&mut self) -> Result<(), Anomaly> {
        self.redraw = false;

        let result = match self.awaiting_key {
            Some(vx) => {
                self.resume_key_wait(vx);
                Ok(())
            }
            None => {
                let (addr, ins) = self.fetch_decode();
                log::trace!("{addr:#05X}: {ins:?}");
                self.execute_ins(addr, ins)
            }
        };

        self.sync_timers();

        if let Err(anomaly) = &result {
            log::debug!("{anomaly}");
        }
        result
    }

    /// Reads the instruction under pc and moves pc past it, before anything executes.
    fn fetch_decode(&mut self) -> (TypeAddr, OpCodes) {
        let addr = self.mem.pc.0;
        let ins = self.mem.fetch();
        self.mem.pc.increment();
        (addr, OpCodes::decode_raw(ins))
    }

    fn execute_ins(&mut self, addr: TypeAddr, ins: OpCodes) -> Result<(), Anomaly> {
        match ins {
            OpCodes::ClearScreen => {
                self.fb.clear_buffer();
                self.redraw = true;
            }
            OpCodes::Return => match self.mem.stack.pop() {
                Some(ret) => self.mem.pc.set_addr(ret),
                None => return Err(Anomaly::StackUnderflow { addr }),
            },
            OpCodes::Jump(nnn) => self.mem.pc.set_addr(nnn),
            OpCodes::Call(nnn) => {
                // return to the instruction after the call
                if !self.mem.stack.push(self.mem.pc.0) {
                    return Err(Anomaly::StackOverflow { addr });
                }
                self.mem.pc.set_addr(nnn);
            }
            OpCodes::SkipEqualConstant(vx, nn) => self.skip_if(self.regs.get(vx) == nn),
            OpCodes::SkipNotEqualConstant(vx, nn) => self.skip_if(self.regs.get(vx) != nn),
            OpCodes::SkipEqualRegister(vx, vy) => {
                self.skip_if(self.regs.get(vx) == self.regs.get(vy))
            }
            OpCodes::SkipNotEqualRegister(vx, vy) => {
                self.skip_if(self.regs.get(vx) != self.regs.get(vy))
            }
            OpCodes::SetRegister(vx, nn) => self.regs.set_register(vx, nn),
            OpCodes::AddToRegister(vx, nn) => self.regs.add_to_register(vx, nn),
            OpCodes::CopyRegister(vx, vy) => self.regs.set_register(vx, self.regs.get(vy)),
            OpCodes::Or(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) | self.regs.get(vy));
            }
            OpCodes::And(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) & self.regs.get(vy));
            }
            OpCodes::XOr(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) ^ self.regs.get(vy));
            }
            // Flag-setting ALU ops decide VF from the operands, write it, then compute VX from
            // the registers as they now stand. VF as an operand sees the new flag.
            OpCodes::Add(vx, vy) => {
                let carry = self.regs.get(vx).checked_add(self.regs.get(vy)).is_none();
                self.regs.set_flag(carry);
                let sum = self.regs.get(vx).wrapping_add(self.regs.get(vy));
                self.regs.set_register(vx, sum);
            }
            OpCodes::SubtractForward(vx, vy) => {
                self.regs.set_flag(self.regs.get(vx) <= self.regs.get(vy));
                let diff = self.regs.get(vx).wrapping_sub(self.regs.get(vy));
                self.regs.set_register(vx, diff);
            }
            OpCodes::SubtractBackward(vx, vy) => {
                self.regs.set_flag(self.regs.get(vx) > self.regs.get(vy));
                let diff = self.regs.get(vy).wrapping_sub(self.regs.get(vx));
                self.regs.set_register(vx, diff);
            }
            OpCodes::RightShift(vx) => {
                self.regs.set_register(FLAG, self.regs.get(vx) & 1);
                self.regs.set_register(vx, self.regs.get(vx) >> 1);
            }
            OpCodes::LeftShift(vx) => {
                self.regs.set_register(FLAG, (self.regs.get(vx) >> 7) & 1);
                self.regs.set_register(vx, self.regs.get(vx) << 1);
            }
            OpCodes::SetIndexRegister(nnn) => self.mem.index.set_addr(nnn),
            OpCodes::JumpWithOffset(nnn) => {
                self.mem.pc.set_addr(nnn + self.regs.get(0) as u16);
            }
            OpCodes::Random(vx, nn) => {
                let ransuu: u8 = self.rng.gen();
                self.regs.set_register(vx, ransuu & nn);
            }
            OpCodes::Display(reg_x, reg_y, height) => {
                let (x, y) = (self.regs.get(reg_x), self.regs.get(reg_y));
                let sprite = self.mem.slice_from_index(height);
                let collision = self.fb.paint(x, y, &sprite);
                self.regs.set_flag(collision);
                self.redraw = true;
            }
            OpCodes::SkipIfPressed(vx) => self.skip_if(self.keys.is_pressed(self.regs.get(vx))),
            OpCodes::SkipIfNotPressed(vx) => {
                self.skip_if(!self.keys.is_pressed(self.regs.get(vx)))
            }
            OpCodes::CopyDelayToRegister(vx) => self.regs.set_register(vx, self.delay_timer),
            OpCodes::WaitForKey(vx) => {
                if !self.take_key(vx) {
                    // park on this instruction until a key shows up
                    self.mem.pc.set_addr(addr);
                    self.awaiting_key = Some(vx);
                }
            }
            OpCodes::CopyRegisterToDelay(vx) => self.delay_timer = self.regs.get(vx),
            OpCodes::CopyRegisterToSound(vx) => self.sound_timer = self.regs.get(vx),
            OpCodes::AddToIndex(vx) => {
                let index = self.mem.index.offset(self.regs.get(vx) as u16);
                self.mem.index.set_addr(index);
            }
            OpCodes::PointChar(vx) => {
                self.mem
                    .index
                    .set_addr(self.regs.get(vx) as u16 * GLYPH_SIZE);
            }
            OpCodes::ToDecimal(vx) => {
                let value = self.regs.get(vx);
                let digits = [value / 100, (value / 10) % 10, value % 10];
                for (i, digit) in digits.into_iter().enumerate() {
                    self.mem.set(self.mem.index.offset(i as u16), digit);
                }
            }
            OpCodes::StoreRegisterToMemory(vx) => {
                for reg in 0..=vx {
                    self.mem
                        .set(self.mem.index.offset(reg as u16), self.regs.get(reg));
                }
            }
            OpCodes::LoadRegisterFromMemory(vx) => {
                for reg in 0..=vx {
                    let reg_val = self.mem.get(self.mem.index.offset(reg as u16));
                    self.regs.set_register(reg, reg_val);
                }
            }
            OpCodes::Unknown(opcode) => return Err(Anomaly::UnknownOpcode { opcode, addr }),
        }
        Ok(())
    }

    fn skip_if(&mut self, cond: bool) {
        if cond {
            self.mem.pc.increment();
        }
    }

    // True if a key was down, in which case FX0A is satisfied.
    fn take_key(&mut self, vx: u8) -> bool {
        let Some(key) = self.keys.first_pressed() else {
            return false;
        };
        if self.quirks.capture_key_on_wait {
            self.regs.set_register(vx, key);
        }
        true
    }

    fn resume_key_wait(&mut self, vx: u8) {
        if self.take_key(vx) {
            self.awaiting_key = None;
            self.mem.pc.increment();
        }
    }

    pub fn sync_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    pub fn frame_buffer(&self) -> &[u8] {
        self.fb.pixels()
    }

    /// Whether the last `step` changed the frame buffer.
    pub fn redraw(&self) -> bool {
        self.redraw
    }

    pub fn keys_mut(&mut self) -> &mut Keyboard {
        &mut self.keys
    }

    pub fn set_key(&mut self, key: u8, pressed: bool) {
        self.keys.set_key(key, pressed);
    }

    pub fn register(&self, reg_num: u8) -> u8 {
        self.regs.get(reg_num)
    }

    pub fn registers(&self) -> &[u8] {
        self.regs.as_slice()
    }

    pub fn pc(&self) -> TypeAddr {
        self.mem.pc.0
    }

    pub fn index(&self) -> TypeAddr {
        self.mem.index.0
    }

    pub fn stack_pointer(&self) -> usize {
        self.mem.stack.sp()
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    /// For hosts that want to beep while the sound timer runs.
    pub fn sound_active(&self) -> bool {
        self.sound_timer > 0
    }

    pub fn memory(&self) -> &[u8] {
        self.mem.as_slice()
    }

    pub fn is_awaiting_key(&self) -> bool {
        self.awaiting_key.is_some()
    }
}
