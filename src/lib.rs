mod nibble;
pub mod vm;

pub use nibble::u4;
pub use vm::*;
