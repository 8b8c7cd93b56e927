use super::{
    AluOp, Cpu, DISPLAY_CELLS, DISPLAY_X, DISPLAY_Y, Opcode, Quirks, StepOutcome,
    UnknownOpcodePolicy, VmError,
};
use crate::u4;

impl Cpu {
    /// Performs the state transition for one decoded instruction.
    ///
    /// The program counter already points past the instruction word, so
    /// skips add 2 and the key-wait rewinds by 2.
    pub(crate) fn execute(&mut self, opcode: Opcode) -> Result<StepOutcome, VmError> {
        match opcode {
            Opcode::ClearScreen => {
                self.display = [false; DISPLAY_CELLS];
            }
            Opcode::Return => {
                self.pc = self.stack_pop()?;
            }
            Opcode::Jump { nnn } => {
                self.pc = nnn;
            }
            Opcode::Call { nnn } => {
                self.stack_push(self.pc)?;
                self.pc = nnn;
            }
            Opcode::JumpOffset { x, nnn } => match self.options.quirks {
                // The reference machine turns this into an index-register
                // increment, reading Vx (the top nibble of nnn) rather
                // than V0.
                Quirks::Reference => {
                    self.i = self
                        .i
                        .wrapping_add(nnn)
                        .wrapping_add(self.v[x].into());
                }
                Quirks::Canonical => {
                    self.pc = nnn.wrapping_add(self.v[0].into());
                }
            },
            Opcode::SkipEqImm { x, nn } => {
                if self.v[x] == nn {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Opcode::SkipNeImm { x, nn } => {
                if self.v[x] != nn {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Opcode::SkipEqReg { x, y } => {
                if self.v[x] == self.v[y] {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Opcode::SkipNeReg { x, y } => {
                if self.v[x] != self.v[y] {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Opcode::LoadImm { x, nn } => {
                self.v[x] = nn;
            }
            Opcode::AddImm { x, nn } => {
                self.v[x] = self.v[x].wrapping_add(nn);
            }
            Opcode::Alu { x, y, op } => {
                self.execute_alu(x, y, op);
            }
            Opcode::LoadIndex { nnn } => {
                self.i = nnn;
            }
            Opcode::AddIndex { x } => {
                self.i = self.i.wrapping_add(self.v[x].into());

                match self.options.quirks {
                    // The reference flags at a fixed threshold and never
                    // clears the flag back to zero.
                    Quirks::Reference => {
                        if self.i > 1000 {
                            self.v[0xF] = 1;
                        }
                    }
                    Quirks::Canonical => {
                        self.v[0xF] = (self.i > 0xFFF) as u8;
                    }
                }
            }
            Opcode::Rand { x, nn } => {
                let byte: u8 = rand::random_range(0..255);
                self.v[x] = byte.wrapping_add(nn);
            }
            Opcode::Draw { x, y, n } => {
                self.execute_draw(x, y, n)?;
            }
            Opcode::SkipKeyPressed { x } => {
                if self.keys[u4::truncate(self.v[x])] {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Opcode::SkipKeyReleased { x } => {
                if !self.keys[u4::truncate(self.v[x])] {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Opcode::WaitKey { x } => {
                return Ok(self.execute_wait_key(x));
            }
            Opcode::GetDelay { x } => {
                self.v[x] = self.delay_timer;
            }
            Opcode::SetDelay { x } => {
                self.delay_timer = self.v[x];
            }
            Opcode::SetSound { x } => {
                self.sound_timer = self.v[x];
            }
            Opcode::FontDigit { x } => {
                self.i = u16::from(self.v[x]) * 5;
            }
            Opcode::StoreBcd { x } => {
                let value = self.v[x];
                self.mem_write(self.i, value / 100)?;
                self.mem_write(self.i.wrapping_add(1), (value / 10) % 10)?;
                self.mem_write(self.i.wrapping_add(2), value % 10)?;
            }
            Opcode::StoreRegs { x } => {
                for reg in 0..=usize::from(x) {
                    self.mem_write(self.i.wrapping_add(reg as u16), self.v[reg])?;
                }
            }
            Opcode::LoadRegs { x } => {
                for reg in 0..=usize::from(x) {
                    self.v[reg] = self.mem_read(self.i.wrapping_add(reg as u16))?;
                }
            }
            Opcode::Unknown(word) => match self.options.unknown_opcode {
                UnknownOpcodePolicy::Ignore => {
                    log::warn!("ignoring unknown opcode {word:#06X}");
                }
                UnknownOpcodePolicy::Fail => {
                    return Err(VmError::UnknownOpcode { opcode: word });
                }
            },
        };

        Ok(StepOutcome::Continue)
    }

    /// The 8xyN group. Flag and result writes happen in the reference's
    /// order, so instructions naming VF as their destination alias the flag
    /// register the same way.
    fn execute_alu(&mut self, x: u4, y: u4, op: AluOp) {
        match op {
            AluOp::Mov => self.v[x] = self.v[y],
            AluOp::Or => self.v[x] |= self.v[y],
            AluOp::And => self.v[x] &= self.v[y],
            AluOp::Xor => self.v[x] ^= self.v[y],
            AluOp::Add => {
                let sum = u16::from(self.v[x]) + u16::from(self.v[y]);
                self.v[0xF] = (sum > 255) as u8;
                self.v[x] = sum as u8;
            }
            AluOp::Sub => {
                self.v[0xF] = (self.v[x] > self.v[y]) as u8;
                self.v[x] = self.v[x].wrapping_sub(self.v[y]);
            }
            AluOp::Subn => {
                self.v[0xF] = (self.v[y] > self.v[x]) as u8;
                self.v[x] = self.v[y].wrapping_sub(self.v[x]);
            }
            AluOp::Shr => {
                self.v[x] = self.v[y];
                self.v[0xF] = match self.options.quirks {
                    // The reference masks the 8-bit value with 0xF000,
                    // which is always zero.
                    Quirks::Reference => 0,
                    Quirks::Canonical => self.v[x] & 1,
                };
                self.v[x] >>= 1;
            }
            AluOp::Shl => {
                self.v[x] = self.v[y];
                self.v[0xF] = match self.options.quirks {
                    Quirks::Reference => 0,
                    Quirks::Canonical => (self.v[x] >> 7) & 1,
                };
                self.v[x] <<= 1;
            }
        }
    }

    /// Dxyn: XOR an 8-wide, `n`-tall sprite into the display, reporting
    /// collisions through VF.
    fn execute_draw(&mut self, x: u4, y: u4, n: u4) -> Result<(), VmError> {
        let x0 = usize::from(self.v[x]) % DISPLAY_X;
        let y0 = usize::from(self.v[y]) % DISPLAY_Y;

        self.v[0xF] = 0;

        for row in 0..usize::from(n) {
            let sprite = self.mem_read(self.i.wrapping_add(row as u16))?;

            for col in 0..8 {
                if sprite & (0x80 >> col) == 0 {
                    continue;
                }

                let index = match self.options.quirks {
                    // Flat indexing like the reference: sprites crossing
                    // the right edge spill onto the next row, and writes
                    // past the last row are refused rather than allowed to
                    // scribble over unrelated state.
                    Quirks::Reference => {
                        let index = x0 + col + (y0 + row) * DISPLAY_X;
                        if index >= DISPLAY_CELLS {
                            return Err(VmError::DisplayOutOfBounds { index });
                        }
                        index
                    }
                    Quirks::Canonical => {
                        (x0 + col) % DISPLAY_X + ((y0 + row) % DISPLAY_Y) * DISPLAY_X
                    }
                };

                if self.display[index] {
                    self.v[0xF] = 1;
                }
                self.display[index] ^= true;
            }
        }

        Ok(())
    }

    /// Fx0A: scan the keypad, preferring the highest-indexed pressed key
    /// like the reference scan loop does. With nothing pressed the program
    /// counter is rewound so the instruction re-executes next cycle.
    fn execute_wait_key(&mut self, x: u4) -> StepOutcome {
        let mut pressed = None;
        for key in 0..16u8 {
            if self.keys[key as usize] {
                pressed = Some(key);
            }
        }

        match pressed {
            Some(key) => {
                self.v[x] = key;
                StepOutcome::Continue
            }
            None => {
                self.pc = self.pc.wrapping_sub(2);
                StepOutcome::WaitingForKey(x)
            }
        }
    }
}
