//! Stack-based script processor for transaction validation.
//!
//! A script is a whitespace-separated sequence of tokens. Literal tokens push
//! a typed value and opcode tokens pop operands and push results; the final
//! stack is the script's outcome.
//!
//! # Architecture
//!
//! - **Operands**: [`value::StackValue`] (`Int`, `Bool`, `Bytes`, `Signature`, `PublicKey`)
//! - **Tokens**: parsed lazily, one at a time, by [`token::parse_token`]
//! - **Halting**: a failed `OP_EqualVerify` stops the script with result `[false]`
//! - **Signatures**: `OP_CheckSig` verifies ECDSA over any curve in the
//!   configured [`crate::crypto::curves::CurveRegistry`]
//!
//! # Modules
//!
//! - [`errors`]: Script execution error type
//! - [`isa`]: Opcode definitions and mnemonic mappings
//! - [`processor`]: The interpreter loop and opcode handlers
//! - [`token`]: Literal and opcode token parsing
//! - [`value`]: Stack value type and its byte form

pub mod errors;
pub mod isa;
#[cfg(test)]
mod isa_static_check;
pub mod processor;
pub mod token;
pub mod value;
