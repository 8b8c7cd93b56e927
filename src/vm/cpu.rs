use super::{
    DISPLAY_CELLS, DISPLAY_X, FONT, FONT_END_ADDRESS, FONT_START_ADDRESS, Opcode, STACK_DEPTH,
    StepOutcome, VmError, VmOptions,
};
use crate::u4;

pub(crate) const ROM_START_ADDRESS: usize = 0x200;
pub(crate) const MEMORY_SIZE: usize = 4096;

/// CHIP-8 virtual machine state.
///
/// The machine owns no I/O: key state is written in through [`Cpu::set_key`],
/// the display is read out through [`Cpu::pixel`], and the sound timer is
/// exposed for an audio collaborator that decays it at its own cadence.
pub struct Cpu {
    /// 4KB memory array, fontset at the bottom, program at 0x200.
    pub(crate) memory: [u8; MEMORY_SIZE],
    /// 64x32 monochrome pixels, row-major (`x + y * 64`).
    pub(crate) display: [bool; DISPLAY_CELLS],

    /// Program counter: address of the next instruction to fetch.
    pub(crate) pc: u16,
    /// Index register: memory pointer for draw/BCD/register-dump operations.
    pub(crate) i: u16,
    /// General-purpose registers V0-VF. VF doubles as the flag register.
    pub(crate) v: [u8; 16],
    /// Fixed-depth call stack and its stack pointer.
    pub(crate) stack: [u16; STACK_DEPTH],
    pub(crate) sp: usize,

    /// Decremented once per executed instruction while non-zero.
    pub(crate) delay_timer: u8,
    /// Written by FX18 but never decremented here; decay belongs to the
    /// audio collaborator.
    pub(crate) sound_timer: u8,

    /// Keypad state, written only by the input collaborator.
    pub(crate) keys: [bool; 16],

    pub(crate) options: VmOptions,
}

impl Cpu {
    pub fn new(options: VmOptions) -> Self {
        let mut memory = [0; MEMORY_SIZE];
        memory[FONT_START_ADDRESS..FONT_END_ADDRESS].copy_from_slice(&FONT);

        Cpu {
            memory,
            display: [false; DISPLAY_CELLS],
            pc: ROM_START_ADDRESS as u16,
            i: 0,
            v: [0; 16],
            stack: [0; STACK_DEPTH],
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            keys: [false; 16],
            options,
        }
    }

    /// Loads a ROM image into memory at the program start address.
    pub fn load(&mut self, rom: &[u8]) -> Result<(), VmError> {
        let rom_end = ROM_START_ADDRESS + rom.len();
        self.memory
            .get_mut(ROM_START_ADDRESS..rom_end)
            .ok_or(VmError::RomTooLarge {
                size: rom.len(),
                max_size: MEMORY_SIZE - ROM_START_ADDRESS,
            })?
            .copy_from_slice(rom);

        self.pc = ROM_START_ADDRESS as u16;

        log::debug!("loaded {} byte ROM at {ROM_START_ADDRESS:#05X}", rom.len());
        Ok(())
    }

    /// Executes a single fetch/decode/execute cycle, then decays the delay
    /// timer. One call is one emulated instruction.
    pub fn step(&mut self) -> Result<StepOutcome, VmError> {
        let word = self.fetch()?;
        let outcome = self.execute(Opcode::decode(word))?;

        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        }

        Ok(outcome)
    }

    /// Fetches the next big-endian instruction word and advances the
    /// program counter past it.
    pub(crate) fn fetch(&mut self) -> Result<u16, VmError> {
        let high = self.mem_read(self.pc)?;
        let low = self.mem_read(self.pc.wrapping_add(1))?;
        self.pc = self.pc.wrapping_add(2);

        Ok(u16::from_be_bytes([high, low]))
    }

    /// Set the state of a key on the keypad.
    pub fn set_key(&mut self, key: u4, pressed: bool) {
        self.keys[key] = pressed;
    }

    /// Get the state of a display pixel (true = lit).
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.display[x + y * DISPLAY_X]
    }

    /// True while the sound timer is running.
    pub fn should_beep(&self) -> bool {
        self.sound_timer > 0
    }

    /// Ticks the sound timer down by one. Meant to be called by the audio
    /// collaborator at its own cadence (nominally 60Hz); the instruction
    /// cycle never touches this timer.
    pub fn decay_sound_timer(&mut self) {
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    pub(crate) fn mem_read(&self, addr: u16) -> Result<u8, VmError> {
        self.memory
            .get(addr as usize)
            .copied()
            .ok_or(VmError::MemoryOutOfBounds { address: addr })
    }

    pub(crate) fn mem_write(&mut self, addr: u16, value: u8) -> Result<(), VmError> {
        *self
            .memory
            .get_mut(addr as usize)
            .ok_or(VmError::MemoryOutOfBounds { address: addr })? = value;
        Ok(())
    }

    pub(crate) fn stack_push(&mut self, addr: u16) -> Result<(), VmError> {
        if self.sp >= STACK_DEPTH {
            return Err(VmError::StackOverflow);
        }
        self.stack[self.sp] = addr;
        self.sp += 1;
        Ok(())
    }

    pub(crate) fn stack_pop(&mut self) -> Result<u16, VmError> {
        self.sp = self.sp.checked_sub(1).ok_or(VmError::StackUnderflow)?;
        Ok(self.stack[self.sp])
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new(VmOptions::default())
    }
}
