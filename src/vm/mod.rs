mod cpu;
mod execute;
mod font;
mod opcode;
mod types;

pub use cpu::*;
pub use font::*;
pub use opcode::*;
pub use types::*;
