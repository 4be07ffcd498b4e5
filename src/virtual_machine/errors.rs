use crate::crypto::errors::CryptoError;
use crate::types::der::ObjectIdentifier;
use thiserror::Error;

/// Errors that abort a script run.
///
/// A failed signature check or `OP_EqualVerify` is not an error; it shows up
/// as `false` on the stack or as a halted run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProcessorError {
    /// Token is neither a literal nor a known opcode mnemonic.
    #[error("unknown opcode: {0}")]
    UnknownOpcode(String),
    /// Opcode needed more operands than the stack holds.
    #[error("{opcode} needs {needed} operands but the stack holds {available}")]
    StackUnderflow {
        opcode: &'static str,
        needed: usize,
        available: usize,
    },
    /// Operand has the wrong type for the opcode.
    #[error("{opcode} expected operand {operand} to be {expected} but got {actual}")]
    TypeMismatch {
        opcode: &'static str,
        operand: usize,
        expected: &'static str,
        actual: &'static str,
    },
    /// Public key names a curve missing from the registry.
    #[error("unknown curve {0}")]
    UnknownCurve(ObjectIdentifier),
    /// Public key uses an algorithm other than id-ecPublicKey.
    #[error("unsupported key algorithm {0}")]
    UnsupportedKeyAlgorithm(ObjectIdentifier),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
