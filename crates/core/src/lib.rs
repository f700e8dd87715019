//! Shared foundation for the nand2tetris toolchain.
//!
//! Three independent tools (`hack-asm`, `hack-vm`, `jack-compiler`) build
//! on this crate for source-location tracking, a common error taxonomy,
//! directory discovery, and a reference Hack CPU the other crates' tests
//! run emitted code against.

pub mod diagnostic;
pub mod discover;
pub mod emulator;

pub use diagnostic::{SourceLocation, ToolError};
pub use discover::files_with_extension;
pub use emulator::Cpu;
