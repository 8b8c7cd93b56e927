pub const DISPLAY_X: usize = 64;
pub const DISPLAY_Y: usize = 32;
/// Number of cells in the flat, row-major display buffer.
pub const DISPLAY_CELLS: usize = DISPLAY_X * DISPLAY_Y;

/// Maximum call stack depth.
pub const STACK_DEPTH: usize = 16;

/// Outcome of a single fetch/decode/execute cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The instruction completed; the machine is ready for the next cycle.
    Continue,
    /// A key-wait instruction found no key pressed. The program counter has
    /// been rewound so the same instruction re-executes next cycle; the
    /// driving loop should keep stepping and keep feeding key state.
    WaitingForKey(crate::u4),
}

/// Error types that can occur during emulation.
#[derive(Debug, thiserror::Error)]
pub enum VmError {
    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("memory access out of bounds at address {address:#06X}")]
    MemoryOutOfBounds { address: u16 },

    #[error("sprite write out of bounds at display cell {index}")]
    DisplayOutOfBounds { index: usize },

    #[error("call stack overflow (maximum depth {STACK_DEPTH})")]
    StackOverflow,

    #[error("return from a subroutine with empty call stack")]
    StackUnderflow,

    #[error("unknown opcode: {opcode:#06X}")]
    UnknownOpcode { opcode: u16 },
}

/// Selects between bug-for-bug fidelity to the reference machine and
/// canonical CHIP-8 semantics for the instructions where they differ
/// (shift flags, BNNN, FX1E overflow flag, sprite edge handling).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Quirks {
    /// Reproduce the reference behavior exactly.
    #[default]
    Reference,
    /// Canonical CHIP-8 semantics.
    Canonical,
}

/// What to do with an instruction word matching no known pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownOpcodePolicy {
    /// Treat as a no-op (the reference behavior, most compatible).
    #[default]
    Ignore,
    /// Surface a [`VmError::UnknownOpcode`] for diagnostics.
    Fail,
}

/// Behavior knobs for the virtual machine.
#[derive(Clone, Copy, Debug, Default)]
pub struct VmOptions {
    pub quirks: Quirks,
    pub unknown_opcode: UnknownOpcodePolicy,
}
