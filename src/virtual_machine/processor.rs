//! Stack processor: executes a script token by token against one operand stack.
//!
//! Each token is parsed just before it runs, so tokens after a halting
//! `OP_EqualVerify` are never looked at.

use crate::crypto::curve_domain::CurveDomain;
use crate::crypto::curve_point::CurvePoint;
use crate::crypto::curves::CurveRegistry;
use crate::crypto::ecdsa::{Ecdsa, Signature};
use crate::crypto::hash::HashAlgorithm;
use crate::types::der::ObjectIdentifier;
use crate::types::public_key_info::PublicKeyInfo;
use crate::virtual_machine::errors::ProcessorError;
use crate::virtual_machine::isa::Opcode;
use crate::virtual_machine::token::{Token, parse_token};
use crate::virtual_machine::value::{StackValue, format_stack};
use crate::{debug, info};
use num_bigint::BigInt;
use std::sync::Arc;

/// Curves and hash function a processor runs with.
#[derive(Clone, Debug, Default)]
pub struct ProcessorConfig {
    /// Curves that `pubkey:` records may name.
    pub curves: CurveRegistry,
    /// Hash used by `OP_HASH` and for signature digests.
    pub hash: HashAlgorithm,
}

impl ProcessorConfig {
    pub fn with_hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self
    }

    pub fn with_curve(mut self, oid: ObjectIdentifier, domain: Arc<CurveDomain>) -> Self {
        self.curves = self.curves.with_curve(oid, domain);
        self
    }
}

/// Splits script source into tokens on whitespace.
pub fn tokenize(source: &str) -> Vec<String> {
    source.split_whitespace().map(str::to_string).collect()
}

macro_rules! exec_op {
    (
        processor = $processor:ident,
        opcode = $opcode:ident,
        { $( $variant:ident => $handler:ident ( $( $operand:ident ),* ) ),* $(,)? }
    ) => {{
        match $opcode {
            $(
                Opcode::$variant => {
                    let [$( $operand ),*] =
                        $processor.pop_operands::<{ exec_op!(@count $( $operand )*) }>($opcode)?;
                    $processor.$handler($opcode.mnemonic(), $( $operand ),*)
                }
            ),*
        }
    }};

    (@count) => { 0usize };
    (@count $head:ident $( $tail:ident )*) => { 1usize + exec_op!(@count $( $tail )*) };
}

/// Single-use script interpreter.
///
/// Owns its operand stack and halt flag; [`StackProcessor::run`] consumes it.
pub struct StackProcessor<'a> {
    tokens: Vec<String>,
    config: &'a ProcessorConfig,
    stack: Vec<StackValue>,
    halted: bool,
}

impl<'a> StackProcessor<'a> {
    pub fn new<I, S>(tokens: I, config: &'a ProcessorConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            config,
            stack: Vec::new(),
            halted: false,
        }
    }

    /// Runs every token and returns the final stack, bottom to top.
    ///
    /// A failed `OP_EqualVerify` halts the script and the result is `[false]`.
    pub fn run(mut self) -> Result<Vec<StackValue>, ProcessorError> {
        let tokens = std::mem::take(&mut self.tokens);
        for (position, token) in tokens.iter().enumerate() {
            if self.halted {
                info!("halted before token {position} ({token}), skipping {} tokens", tokens.len() - position);
                return Ok(vec![StackValue::Bool(false)]);
            }
            debug!("{position}: {token} on {}", format_stack(&self.stack));

            match parse_token(token)? {
                Token::Push(value) => self.stack.push(value),
                Token::Op(opcode) => self.exec(opcode)?,
            }
        }

        if self.halted {
            info!("halted by the final token");
            return Ok(vec![StackValue::Bool(false)]);
        }
        debug!("result {}", format_stack(&self.stack));
        Ok(self.stack)
    }

    fn exec(&mut self, opcode: Opcode) -> Result<(), ProcessorError> {
        exec_op! {
            processor = self,
            opcode = opcode,
            {
                Add => op_add(a, b),
                Equal => op_equal(a, b),
                EqualVerify => op_equal_verify(a, b),
                Dup => op_dup(a),
                Hash => op_hash(a),
                CheckSig => op_check_sig(message, signature, public_key),
            }
        }
    }

    /// Pops `N` operands, returned bottom to top.
    fn pop_operands<const N: usize>(
        &mut self,
        opcode: Opcode,
    ) -> Result<[StackValue; N], ProcessorError> {
        debug_assert_eq!(N, opcode.operands());
        let available = self.stack.len();
        if available < N {
            return Err(ProcessorError::StackUnderflow {
                opcode: opcode.mnemonic(),
                needed: N,
                available,
            });
        }
        self.stack
            .split_off(available - N)
            .try_into()
            .map_err(|rest: Vec<StackValue>| ProcessorError::StackUnderflow {
                opcode: opcode.mnemonic(),
                needed: N,
                available: rest.len(),
            })
    }

    fn int_operand(
        opcode: &'static str,
        operand: usize,
        value: &StackValue,
    ) -> Result<BigInt, ProcessorError> {
        value.as_int().ok_or(ProcessorError::TypeMismatch {
            opcode,
            operand,
            expected: "Int",
            actual: value.type_name(),
        })
    }

    fn op_add(&mut self, opcode: &'static str, a: StackValue, b: StackValue) -> Result<(), ProcessorError> {
        let a = Self::int_operand(opcode, 0, &a)?;
        let b = Self::int_operand(opcode, 1, &b)?;
        self.stack.push(StackValue::Int(a + b));
        Ok(())
    }

    fn op_equal(&mut self, _opcode: &'static str, a: StackValue, b: StackValue) -> Result<(), ProcessorError> {
        self.stack.push(StackValue::Bool(a == b));
        Ok(())
    }

    fn op_equal_verify(
        &mut self,
        opcode: &'static str,
        a: StackValue,
        b: StackValue,
    ) -> Result<(), ProcessorError> {
        if a != b {
            info!("{opcode} failed: {a} != {b}");
            self.halted = true;
        }
        Ok(())
    }

    fn op_dup(&mut self, _opcode: &'static str, a: StackValue) -> Result<(), ProcessorError> {
        self.stack.push(a.clone());
        self.stack.push(a);
        Ok(())
    }

    fn op_hash(&mut self, _opcode: &'static str, a: StackValue) -> Result<(), ProcessorError> {
        let mut hasher = self.config.hash.hasher()?;
        a.write_to(&mut hasher);
        self.stack.push(StackValue::Bytes(hasher.finalize()));
        Ok(())
    }

    fn op_check_sig(
        &mut self,
        opcode: &'static str,
        message: StackValue,
        signature: StackValue,
        public_key: StackValue,
    ) -> Result<(), ProcessorError> {
        let (signature_type, key_type) = (signature.type_name(), public_key.type_name());
        let StackValue::Signature(signature) = signature else {
            return Err(ProcessorError::TypeMismatch {
                opcode,
                operand: 1,
                expected: "Signature",
                actual: signature_type,
            });
        };
        let StackValue::PublicKey(public_key) = public_key else {
            return Err(ProcessorError::TypeMismatch {
                opcode,
                operand: 2,
                expected: "PublicKey",
                actual: key_type,
            });
        };

        let valid = self.verify(&message.to_bytes(), &signature, &public_key)?;
        debug!("{opcode}: signature {signature} is {}", if valid { "valid" } else { "invalid" });
        self.stack.push(StackValue::Bool(valid));
        Ok(())
    }

    fn verify(
        &self,
        message: &[u8],
        signature: &Signature,
        public_key: &PublicKeyInfo,
    ) -> Result<bool, ProcessorError> {
        if !public_key.is_ec() {
            return Err(ProcessorError::UnsupportedKeyAlgorithm(public_key.algorithm.clone()));
        }
        let domain = self
            .config
            .curves
            .get(&public_key.curve)
            .ok_or_else(|| ProcessorError::UnknownCurve(public_key.curve.clone()))?;
        let point = CurvePoint::from_octets(domain, &public_key.point)?;
        let ecdsa = Ecdsa::new(domain.clone(), self.config.hash);
        Ok(ecdsa.verify(&point, message, signature)?)
    }
}
