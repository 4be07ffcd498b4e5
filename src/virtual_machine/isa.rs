//! Opcode definitions.
//!
//! The [`for_each_opcode!`](crate::for_each_opcode) macro holds the canonical
//! opcode list and invokes a callback macro for code generation, so the
//! opcode table and its consistency checks never drift apart.
//!
//! This module generates the [`Opcode`] enum, its mnemonics, operand counts
//! and `TryFrom<&str>` for resolving script tokens.
//!
//! # Stack effects
//!
//! Operands are listed bottom to top; the last one is on top of the stack.

use crate::virtual_machine::errors::ProcessorError;

/// Invokes a callback macro with the complete opcode list.
#[macro_export]
macro_rules! for_each_opcode {
    ($callback:ident) => {
        $callback! {
            /// ADD ; a b -> a+b (booleans count as 0 and 1)
            Add, "ADD", 2,
            /// EQUAL ; a b -> (a == b)
            Equal, "EQUAL", 2,
            /// OP_EqualVerify ; a b -> halts the script unless a == b
            EqualVerify, "OP_EqualVerify", 2,
            /// OP_DUP ; a -> a a
            Dup, "OP_DUP", 1,
            /// OP_HASH ; a -> hash(a)
            Hash, "OP_HASH", 1,
            /// OP_CheckSig ; message signature pubkey -> valid
            CheckSig, "OP_CheckSig", 3,
        }
    };
}

#[macro_export]
macro_rules! define_opcodes {
    (
        $(
            $(#[$doc:meta])*
            $name:ident, $mnemonic:literal, $operands:expr
        ),* $(,)?
    ) => {
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum Opcode {
            $(
                $(#[$doc])*
                $name,
            )*
        }

        impl Opcode {
            /// Every opcode, in definition order.
            pub const ALL: &'static [Opcode] = &[ $( Opcode::$name, )* ];

            /// Returns the script mnemonic for this opcode.
            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $( Opcode::$name => $mnemonic, )*
                }
            }

            /// Returns how many operands this opcode pops.
            pub const fn operands(&self) -> usize {
                match self {
                    $( Opcode::$name => $operands, )*
                }
            }
        }

        impl TryFrom<&str> for Opcode {
            type Error = ProcessorError;

            fn try_from(token: &str) -> Result<Self, Self::Error> {
                match token {
                    $( $mnemonic => Ok(Opcode::$name), )*
                    _ => Err(ProcessorError::UnknownOpcode(token.to_string())),
                }
            }
        }
    };
}

for_each_opcode!(define_opcodes);

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_try_from_unknown() {
        assert_eq!(
            Opcode::try_from("OP_NOPE"),
            Err(ProcessorError::UnknownOpcode("OP_NOPE".to_string()))
        );
        // mnemonics are case sensitive
        assert!(Opcode::try_from("add").is_err());
        assert!(Opcode::try_from("OP_CHECKSIG").is_err());
    }

    #[test]
    fn mnemonics_round_trip() {
        for &opcode in Opcode::ALL {
            assert_eq!(Opcode::try_from(opcode.mnemonic()), Ok(opcode));
            assert_eq!(opcode.to_string(), opcode.mnemonic());
        }
    }

    #[test]
    fn operand_counts() {
        assert_eq!(Opcode::Dup.operands(), 1);
        assert_eq!(Opcode::EqualVerify.operands(), 2);
        assert_eq!(Opcode::CheckSig.operands(), 3);
    }
}
