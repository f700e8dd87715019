//! Encode resolved instructions into their 16-bit binary string form.

use crate::instruction::{Comp, Dest, Jump};

/// `dest` field as three bits: `A D M`.
pub fn dest_bits(dest: Dest) -> &'static str {
    match (dest.a, dest.d, dest.m) {
        (false, false, false) => "000",
        (false, false, true) => "001",
        (false, true, false) => "010",
        (false, true, true) => "011",
        (true, false, false) => "100",
        (true, false, true) => "101",
        (true, true, false) => "110",
        (true, true, true) => "111",
    }
}

/// `comp` field as seven bits: `a c1 c2 c3 c4 c5 c6`.
pub fn comp_bits(comp: Comp) -> &'static str {
    match comp {
        Comp::Zero => "0101010",
        Comp::One => "0111111",
        Comp::NegOne => "0111010",
        Comp::D => "0001100",
        Comp::A => "0110000",
        Comp::NotD => "0001101",
        Comp::NotA => "0110001",
        Comp::NegD => "0001111",
        Comp::NegA => "0110011",
        Comp::DPlus1 => "0011111",
        Comp::APlus1 => "0110111",
        Comp::DMinus1 => "0001110",
        Comp::AMinus1 => "0110010",
        Comp::DPlusA => "0000010",
        Comp::DMinusA => "0010011",
        Comp::AMinusD => "0000111",
        Comp::DAndA => "0000000",
        Comp::DOrA => "0010101",
        Comp::M => "1110000",
        Comp::NotM => "1110001",
        Comp::NegM => "1110011",
        Comp::MPlus1 => "1110111",
        Comp::MMinus1 => "1110010",
        Comp::DPlusM => "1000010",
        Comp::DMinusM => "1010011",
        Comp::MMinusD => "1000111",
        Comp::DAndM => "1000000",
        Comp::DOrM => "1010101",
        Comp::MShl => "1100000",
        Comp::MShr => "1100001",
    }
}

/// `jump` field as three bits.
pub fn jump_bits(jump: Jump) -> &'static str {
    match jump {
        Jump::Null => "000",
        Jump::JGT => "001",
        Jump::JEQ => "010",
        Jump::JGE => "011",
        Jump::JLT => "100",
        Jump::JNE => "101",
        Jump::JLE => "110",
        Jump::JMP => "111",
    }
}

/// Encode a resolved A-instruction address as `0` followed by 15 bits,
/// always decimal-derived (never hex).
pub fn a_instruction(address: u16) -> String {
    format!("0{:015b}", address)
}

/// Encode a C-instruction as `111` followed by comp/dest/jump.
pub fn c_instruction(dest: Dest, comp: Comp, jump: Jump) -> String {
    format!("111{}{}{}", comp_bits(comp), dest_bits(dest), jump_bits(jump))
}
