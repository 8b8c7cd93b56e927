use crate::u4;

/// A decoded instruction word.
///
/// The fields (x, y, n, nn, nnn) carry the operands encoded in the word.
/// Decoding is total: a word matching no pattern becomes [`Opcode::Unknown`],
/// and the execute step decides whether that is an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    /// 00E0 - Clear the display.
    ClearScreen,
    /// 00EE - Return from a subroutine.
    Return,

    /// 1nnn - Jump to address nnn.
    Jump { nnn: u16 },
    /// 2nnn - Call subroutine at nnn.
    Call { nnn: u16 },
    /// Bnnn - Offset jump. Carries `x` because the reference machine reads
    /// `v[x]` here, not `v[0]` (x being the top nibble of nnn).
    JumpOffset { x: u4, nnn: u16 },

    /// 3xnn - Skip next instruction if Vx == nn.
    SkipEqImm { x: u4, nn: u8 },
    /// 4xnn - Skip next instruction if Vx != nn.
    SkipNeImm { x: u4, nn: u8 },
    /// 5xy0 - Skip next instruction if Vx == Vy.
    SkipEqReg { x: u4, y: u4 },
    /// 9xy0 - Skip next instruction if Vx != Vy.
    SkipNeReg { x: u4, y: u4 },

    /// 6xnn - Set Vx = nn.
    LoadImm { x: u4, nn: u8 },
    /// 7xnn - Set Vx = Vx + nn, wrapping.
    AddImm { x: u4, nn: u8 },

    /// 8xyN - Register-to-register ALU operations.
    Alu { x: u4, y: u4, op: AluOp },

    /// Annn - Set I = nnn.
    LoadIndex { nnn: u16 },
    /// Fx1E - Set I = I + Vx.
    AddIndex { x: u4 },

    /// Cxnn - Randomize Vx.
    Rand { x: u4, nn: u8 },
    /// Dxyn - Draw an 8-wide, n-tall sprite from memory[I] at (Vx, Vy).
    Draw { x: u4, y: u4, n: u4 },

    /// Ex9E - Skip next instruction if the key in Vx is pressed.
    SkipKeyPressed { x: u4 },
    /// ExA1 - Skip next instruction if the key in Vx is not pressed.
    SkipKeyReleased { x: u4 },
    /// Fx0A - Block until a key is pressed, store it in Vx.
    WaitKey { x: u4 },

    /// Fx07 - Set Vx = delay timer.
    GetDelay { x: u4 },
    /// Fx15 - Set delay timer = Vx.
    SetDelay { x: u4 },
    /// Fx18 - Set sound timer = Vx.
    SetSound { x: u4 },

    /// Fx29 - Point I at the font glyph for the digit in Vx.
    FontDigit { x: u4 },
    /// Fx33 - Store Vx as three decimal digits at memory[I..I+3].
    StoreBcd { x: u4 },

    /// Fx55 - Store V0..=Vx into memory starting at I.
    StoreRegs { x: u4 },
    /// Fx65 - Load V0..=Vx from memory starting at I.
    LoadRegs { x: u4 },

    /// Any word matching no pattern above.
    Unknown(u16),
}

/// The 8xyN operation selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    Mov,
    Or,
    And,
    Xor,
    Add,
    Sub,
    Shr,
    Subn,
    Shl,
}

impl Opcode {
    /// Decodes a raw 16-bit instruction word.
    pub fn decode(word: u16) -> Opcode {
        let nibble = (
            ((word & 0xF000) >> 12) as u8,
            ((word & 0x0F00) >> 8) as u8,
            ((word & 0x00F0) >> 4) as u8,
            (word & 0x000F) as u8,
        );

        let x = u4::new(nibble.1);
        let y = u4::new(nibble.2);
        let n = u4::new(nibble.3);
        let nn = (word & 0x00FF) as u8;
        let nnn = word & 0x0FFF;

        match nibble {
            (0x0, 0x0, 0xE, 0x0) => Opcode::ClearScreen,
            (0x0, 0x0, 0xE, 0xE) => Opcode::Return,
            (0x1, _, _, _) => Opcode::Jump { nnn },
            (0x2, _, _, _) => Opcode::Call { nnn },
            (0x3, _, _, _) => Opcode::SkipEqImm { x, nn },
            (0x4, _, _, _) => Opcode::SkipNeImm { x, nn },
            (0x5, _, _, 0x0) => Opcode::SkipEqReg { x, y },
            (0x6, _, _, _) => Opcode::LoadImm { x, nn },
            (0x7, _, _, _) => Opcode::AddImm { x, nn },
            (0x8, _, _, _) => Opcode::Alu {
                x,
                y,
                op: match nibble.3 {
                    0x0 => AluOp::Mov,
                    0x1 => AluOp::Or,
                    0x2 => AluOp::And,
                    0x3 => AluOp::Xor,
                    0x4 => AluOp::Add,
                    0x5 => AluOp::Sub,
                    0x6 => AluOp::Shr,
                    0x7 => AluOp::Subn,
                    0xE => AluOp::Shl,
                    _ => return Opcode::Unknown(word),
                },
            },
            (0x9, _, _, 0x0) => Opcode::SkipNeReg { x, y },
            (0xA, _, _, _) => Opcode::LoadIndex { nnn },
            (0xB, _, _, _) => Opcode::JumpOffset { x, nnn },
            (0xC, _, _, _) => Opcode::Rand { x, nn },
            (0xD, _, _, _) => Opcode::Draw { x, y, n },
            (0xE, _, 0x9, 0xE) => Opcode::SkipKeyPressed { x },
            (0xE, _, 0xA, 0x1) => Opcode::SkipKeyReleased { x },
            (0xF, _, 0x0, 0x7) => Opcode::GetDelay { x },
            (0xF, _, 0x0, 0xA) => Opcode::WaitKey { x },
            (0xF, _, 0x1, 0x5) => Opcode::SetDelay { x },
            (0xF, _, 0x1, 0x8) => Opcode::SetSound { x },
            (0xF, _, 0x1, 0xE) => Opcode::AddIndex { x },
            (0xF, _, 0x2, 0x9) => Opcode::FontDigit { x },
            (0xF, _, 0x3, 0x3) => Opcode::StoreBcd { x },
            (0xF, _, 0x5, 0x5) => Opcode::StoreRegs { x },
            (0xF, _, 0x6, 0x5) => Opcode::LoadRegs { x },

            _ => Opcode::Unknown(word),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AluOp, Opcode};
    use crate::u4;

    #[test]
    fn decodes_machine_ops() {
        assert_eq!(Opcode::decode(0x00E0), Opcode::ClearScreen);
        assert_eq!(Opcode::decode(0x00EE), Opcode::Return);
    }

    #[test]
    fn decodes_control_flow() {
        assert_eq!(Opcode::decode(0x1ABC), Opcode::Jump { nnn: 0xABC });
        assert_eq!(Opcode::decode(0x2123), Opcode::Call { nnn: 0x123 });
        assert_eq!(
            Opcode::decode(0xB456),
            Opcode::JumpOffset {
                x: u4::new(4),
                nnn: 0x456
            }
        );
    }

    #[test]
    fn decodes_skips() {
        assert_eq!(
            Opcode::decode(0x3A42),
            Opcode::SkipEqImm {
                x: u4::new(0xA),
                nn: 0x42
            }
        );
        assert_eq!(
            Opcode::decode(0x4A42),
            Opcode::SkipNeImm {
                x: u4::new(0xA),
                nn: 0x42
            }
        );
        assert_eq!(
            Opcode::decode(0x5AB0),
            Opcode::SkipEqReg {
                x: u4::new(0xA),
                y: u4::new(0xB)
            }
        );
        assert_eq!(
            Opcode::decode(0x9AB0),
            Opcode::SkipNeReg {
                x: u4::new(0xA),
                y: u4::new(0xB)
            }
        );
    }

    #[test]
    fn decodes_alu_group() {
        for (word, op) in [
            (0x8120, AluOp::Mov),
            (0x8121, AluOp::Or),
            (0x8122, AluOp::And),
            (0x8123, AluOp::Xor),
            (0x8124, AluOp::Add),
            (0x8125, AluOp::Sub),
            (0x8126, AluOp::Shr),
            (0x8127, AluOp::Subn),
            (0x812E, AluOp::Shl),
        ] {
            assert_eq!(
                Opcode::decode(word),
                Opcode::Alu {
                    x: u4::new(1),
                    y: u4::new(2),
                    op
                }
            );
        }
    }

    #[test]
    fn decodes_timer_and_memory_group() {
        let x = u4::new(0x7);
        assert_eq!(Opcode::decode(0xF707), Opcode::GetDelay { x });
        assert_eq!(Opcode::decode(0xF70A), Opcode::WaitKey { x });
        assert_eq!(Opcode::decode(0xF715), Opcode::SetDelay { x });
        assert_eq!(Opcode::decode(0xF718), Opcode::SetSound { x });
        assert_eq!(Opcode::decode(0xF71E), Opcode::AddIndex { x });
        assert_eq!(Opcode::decode(0xF729), Opcode::FontDigit { x });
        assert_eq!(Opcode::decode(0xF733), Opcode::StoreBcd { x });
        assert_eq!(Opcode::decode(0xF755), Opcode::StoreRegs { x });
        assert_eq!(Opcode::decode(0xF765), Opcode::LoadRegs { x });
    }

    #[test]
    fn unmatched_words_decode_to_unknown() {
        for word in [0x0000u16, 0x00E1, 0x5AB1, 0x812F, 0x9AB5, 0xE900, 0xFF99] {
            assert_eq!(Opcode::decode(word), Opcode::Unknown(word));
        }
    }
}
