//! Translator from the Hack VM intermediate language to Hack assembly.
//!
//! [`parser`] turns `.vm` text into [`command::Command`] values,
//! [`codegen`] emits the corresponding assembly, and [`translator`] drives
//! the whole-directory/bootstrap logic that `main.rs` calls into.

pub mod codegen;
pub mod command;
pub mod parser;
pub mod translator;

pub use command::{ArithOp, Command, Segment};
pub use translator::{translate, translate_path, TranslateError};
