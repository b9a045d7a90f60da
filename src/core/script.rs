//! Script programs
//!
//! A script is kept as its raw program bytes. This module parses programs
//! into operations far enough to meter signature checks and to recognize the
//! standard payment patterns; it does not execute them.

use crate::codec::{compact_size_len, CodecError, Mode, Reader, SliceReader, Writer};
use crate::core::constants::{MAX_SCRIPT_DECODE_SIZE, MAX_SCRIPT_SIZE, MULTISIG_DEFAULT_SIGOPS};
use crate::core::opcode::{self, *};
use crate::crypto::SHORT_HASH_SIZE;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// Script Errors
// =============================================================================

/// Script construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("Invalid hex: {0}")]
    InvalidHex(String),
}

// =============================================================================
// Operations
// =============================================================================

/// A single parsed operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation<'a> {
    pub code: u8,
    /// Pushed bytes, empty for non-push opcodes
    pub data: &'a [u8],
}

impl Operation<'_> {
    pub fn is_push(&self) -> bool {
        opcode::is_push(self.code)
    }
}

/// Iterator over the operations of a program
///
/// Stops at the first push whose length runs past the end of the program.
#[derive(Debug, Clone)]
pub struct Operations<'a> {
    program: &'a [u8],
    position: usize,
    malformed: bool,
}

impl<'a> Operations<'a> {
    /// True once the iterator stopped on a truncated push
    pub fn is_malformed(&self) -> bool {
        self.malformed
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.position.checked_add(len)?;
        let slice = self.program.get(self.position..end)?;
        self.position = end;
        Some(slice)
    }

    fn push_length(&mut self, code: u8) -> Option<usize> {
        match code {
            OP_PUSHDATA1 => self.take(1).map(|b| b[0] as usize),
            OP_PUSHDATA2 => self
                .take(2)
                .map(|b| u16::from_le_bytes([b[0], b[1]]) as usize),
            OP_PUSHDATA4 => self
                .take(4)
                .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize),
            _ => Some(code as usize),
        }
    }
}

impl<'a> Iterator for Operations<'a> {
    type Item = Operation<'a>;

    fn next(&mut self) -> Option<Operation<'a>> {
        if self.malformed || self.position >= self.program.len() {
            return None;
        }

        let code = self.program[self.position];
        self.position += 1;

        if code > OP_PUSHDATA4 {
            return Some(Operation { code, data: &[] });
        }

        let data = self
            .push_length(code)
            .and_then(|len| self.take(len));

        match data {
            Some(data) => Some(Operation { code, data }),
            None => {
                self.malformed = true;
                None
            }
        }
    }
}

// =============================================================================
// Script Patterns
// =============================================================================

/// Standard script shapes, borrowing the relevant bytes from the program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptPattern<'a> {
    /// OP_DUP OP_HASH160 <20> OP_EQUALVERIFY OP_CHECKSIG
    PayKeyHash(&'a [u8]),
    /// OP_HASH160 <20> OP_EQUAL
    PayScriptHash(&'a [u8]),
    /// <public key> OP_CHECKSIG
    PayPublicKey(&'a [u8]),
    /// OP_m <public keys> OP_n OP_CHECKMULTISIG
    PayMultisig { required: u8, keys: usize },
    /// OP_RETURN <data>
    NullData,
    /// <endorsement> <public key>
    SignKeyHash { public_key: &'a [u8] },
    /// OP_0 <endorsements> <redeem script>
    SignScriptHash { redeem_script: &'a [u8] },
    NonStandard,
}

impl ScriptPattern<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            ScriptPattern::PayKeyHash(_) => "pay_key_hash",
            ScriptPattern::PayScriptHash(_) => "pay_script_hash",
            ScriptPattern::PayPublicKey(_) => "pay_public_key",
            ScriptPattern::PayMultisig { .. } => "pay_multisig",
            ScriptPattern::NullData => "null_data",
            ScriptPattern::SignKeyHash { .. } => "sign_key_hash",
            ScriptPattern::SignScriptHash { .. } => "sign_script_hash",
            ScriptPattern::NonStandard => "non_standard",
        }
    }
}

/// Compressed (33 bytes) or uncompressed (65 bytes) SEC public key
pub fn is_public_key(data: &[u8]) -> bool {
    match data.first() {
        Some(0x02) | Some(0x03) => data.len() == 33,
        Some(0x04) => data.len() == 65,
        _ => false,
    }
}

/// DER signature followed by a sighash byte, by size and leading tag
pub fn is_endorsement(data: &[u8]) -> bool {
    (9..=73).contains(&data.len()) && data[0] == 0x30
}

// =============================================================================
// Script
// =============================================================================

/// A script program
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Script {
    program: Vec<u8>,
}

impl Script {
    pub const fn new() -> Self {
        Self {
            program: Vec::new(),
        }
    }

    pub fn from_program(program: Vec<u8>) -> Self {
        Self { program }
    }

    pub fn from_hex(text: &str) -> Result<Self, ScriptError> {
        hex::decode(text)
            .map(Self::from_program)
            .map_err(|e| ScriptError::InvalidHex(e.to_string()))
    }

    pub fn program(&self) -> &[u8] {
        &self.program
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.program)
    }

    pub fn len(&self) -> usize {
        self.program.len()
    }

    pub fn is_empty(&self) -> bool {
        self.program.is_empty()
    }

    /// An empty program is indistinguishable from an absent one
    pub fn is_valid(&self) -> bool {
        !self.program.is_empty()
    }

    /// Larger than the interpreter will execute
    pub fn is_oversized(&self) -> bool {
        self.program.len() > MAX_SCRIPT_SIZE
    }

    pub fn reset(&mut self) {
        self.program.clear();
    }

    // Serialization.
    // -------------------------------------------------------------------------

    /// Wire form is length-prefixed; store form is the bare program
    pub fn serialized_size(&self, mode: Mode) -> usize {
        match mode {
            Mode::Wire => compact_size_len(self.program.len() as u64) + self.program.len(),
            Mode::Store => self.program.len(),
        }
    }

    /// Decode a program
    ///
    /// In store mode the program runs to the end of the source, so a store
    /// script must be the last field of its record.
    pub fn from_data<R: Reader>(&mut self, source: &mut R, mode: Mode) -> Result<(), CodecError> {
        self.reset();

        let program = match mode {
            Mode::Wire => source.read_size_prefixed(MAX_SCRIPT_DECODE_SIZE),
            Mode::Store => source.read_remaining(),
        };

        match program {
            Ok(program) => {
                self.program = program;
                Ok(())
            }
            Err(e) => {
                source.invalidate();
                Err(e)
            }
        }
    }

    pub fn from_bytes(data: &[u8], mode: Mode) -> Result<Self, CodecError> {
        let mut script = Self::new();
        script.from_data(&mut SliceReader::new(data), mode)?;
        Ok(script)
    }

    pub fn to_data<W: Writer>(&self, sink: &mut W, mode: Mode) {
        if mode.is_wire() {
            sink.write_compact_size(self.program.len() as u64);
        }
        sink.write_bytes(&self.program);
    }

    pub fn to_bytes(&self, mode: Mode) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.serialized_size(mode));
        self.to_data(&mut data, mode);
        debug_assert_eq!(data.len(), self.serialized_size(mode));
        data
    }

    // Parsing.
    // -------------------------------------------------------------------------

    pub fn operations(&self) -> Operations<'_> {
        Operations {
            program: &self.program,
            position: 0,
            malformed: false,
        }
    }

    /// True when every byte parses into a complete operation
    pub fn is_well_formed(&self) -> bool {
        let mut operations = self.operations();
        operations.by_ref().for_each(drop);
        !operations.is_malformed()
    }

    /// Well formed and made of push operations only
    pub fn is_push_only(&self) -> bool {
        let mut operations = self.operations();
        let all_push = operations.by_ref().all(|op| op.is_push());
        all_push && !operations.is_malformed()
    }

    // Sigops.
    // -------------------------------------------------------------------------

    /// Count signature-check operations
    ///
    /// A multisig check costs the key count pushed right before it when
    /// `accurate` is set and that push is OP_1..OP_16, otherwise the
    /// 20-key maximum.
    pub fn operation_count(&self, accurate: bool) -> usize {
        let mut total = 0usize;
        let mut preceding = OP_1NEGATE;

        for op in self.operations() {
            if opcode::is_signature_check(op.code) {
                total += 1;
            } else if opcode::is_multisig_check(op.code) {
                total += match opcode::to_positive(preceding) {
                    Some(keys) if accurate => keys as usize,
                    _ => MULTISIG_DEFAULT_SIGOPS,
                };
            }
            preceding = op.code;
        }

        total
    }

    /// Sigops of the redeem script revealed when spending a P2SH output
    ///
    /// `prevout_script` is the locking script of the output being spent.
    /// Zero unless it is pay-to-script-hash and this script is push-only.
    pub fn embedded_operation_count(&self, prevout_script: &Script) -> usize {
        if !matches!(prevout_script.pattern(), ScriptPattern::PayScriptHash(_)) {
            return 0;
        }

        if !self.is_push_only() {
            return 0;
        }

        match self.operations().last() {
            Some(last) => Script::from_program(last.data.to_vec()).operation_count(true),
            None => 0,
        }
    }

    // Patterns.
    // -------------------------------------------------------------------------

    /// Classify the program, output patterns first
    pub fn pattern(&self) -> ScriptPattern<'_> {
        let output = self.output_pattern();
        if output != ScriptPattern::NonStandard {
            return output;
        }
        self.input_pattern()
    }

    /// Recognize the standard locking script shapes
    pub fn output_pattern(&self) -> ScriptPattern<'_> {
        let program = self.program.as_slice();

        if program.len() == 25
            && program[0] == OP_DUP
            && program[1] == OP_HASH160
            && program[2] == SHORT_HASH_SIZE as u8
            && program[23] == OP_EQUALVERIFY
            && program[24] == OP_CHECKSIG
        {
            return ScriptPattern::PayKeyHash(&program[3..23]);
        }

        if program.len() == 23
            && program[0] == OP_HASH160
            && program[1] == SHORT_HASH_SIZE as u8
            && program[22] == OP_EQUAL
        {
            return ScriptPattern::PayScriptHash(&program[2..22]);
        }

        if program.first() == Some(&OP_RETURN) {
            return ScriptPattern::NullData;
        }

        let ops: Vec<Operation<'_>> = self.operations().collect();
        if !self.is_well_formed() {
            return ScriptPattern::NonStandard;
        }

        if let [key, check] = ops.as_slice() {
            if check.code == OP_CHECKSIG && is_public_key(key.data) {
                return ScriptPattern::PayPublicKey(key.data);
            }
        }

        if let [first, keys @ .., last, check] = ops.as_slice() {
            if check.code == OP_CHECKMULTISIG {
                if let (Some(required), Some(total)) =
                    (opcode::to_positive(first.code), opcode::to_positive(last.code))
                {
                    let all_keys = keys.iter().all(|op| is_public_key(op.data));
                    if all_keys && total as usize == keys.len() && required <= total {
                        return ScriptPattern::PayMultisig {
                            required,
                            keys: keys.len(),
                        };
                    }
                }
            }
        }

        ScriptPattern::NonStandard
    }

    /// Recognize the standard unlocking script shapes
    pub fn input_pattern(&self) -> ScriptPattern<'_> {
        if !self.is_push_only() {
            return ScriptPattern::NonStandard;
        }

        let ops: Vec<Operation<'_>> = self.operations().collect();

        if let [endorsement, key] = ops.as_slice() {
            if is_endorsement(endorsement.data) && is_public_key(key.data) {
                return ScriptPattern::SignKeyHash {
                    public_key: key.data,
                };
            }
        }

        if let [first, .., last] = ops.as_slice() {
            if first.code == OP_0 {
                let redeem = Script::from_program(last.data.to_vec());
                if redeem.is_valid() && redeem.output_pattern() != ScriptPattern::NonStandard {
                    return ScriptPattern::SignScriptHash {
                        redeem_script: last.data,
                    };
                }
            }
        }

        ScriptPattern::NonStandard
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for op in self.operations() {
            if !first {
                write!(f, " ")?;
            }
            first = false;

            if op.code > OP_0 && op.code <= OP_PUSHDATA4 {
                write!(f, "[{}]", hex::encode(op.data))?;
            } else if let Some(value) = opcode::to_positive(op.code) {
                write!(f, "{}", value)?;
            } else if let Some(name) = opcode::name(op.code) {
                write!(f, "{}", name)?;
            } else {
                write!(f, "0x{:02x}", op.code)?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn public_key(tag: u8) -> Vec<u8> {
        let mut key = vec![0x02];
        key.extend(std::iter::repeat(tag).take(32));
        key
    }

    fn push(data: &[u8]) -> Vec<u8> {
        let mut program = if data.len() <= OP_PUSHBYTES_75 as usize {
            vec![data.len() as u8]
        } else {
            vec![OP_PUSHDATA1, data.len() as u8]
        };
        program.extend_from_slice(data);
        program
    }

    fn multisig(required: u8, keys: &[Vec<u8>]) -> Script {
        let mut program = vec![OP_1 + required - 1];
        for key in keys {
            program.extend(push(key));
        }
        program.push(OP_1 + keys.len() as u8 - 1);
        program.push(OP_CHECKMULTISIG);
        Script::from_program(program)
    }

    fn pay_script_hash() -> Script {
        let mut program = vec![OP_HASH160, 20];
        program.extend([0x11; 20]);
        program.push(OP_EQUAL);
        Script::from_program(program)
    }

    #[test]
    fn test_wire_and_store_forms() {
        let script = Script::from_program(vec![OP_DUP, OP_HASH160]);

        assert_eq!(script.to_bytes(Mode::Wire), vec![0x02, OP_DUP, OP_HASH160]);
        assert_eq!(script.to_bytes(Mode::Store), vec![OP_DUP, OP_HASH160]);
        assert_eq!(script.serialized_size(Mode::Wire), 3);
        assert_eq!(script.serialized_size(Mode::Store), 2);

        let decoded = Script::from_bytes(&[0x02, OP_DUP, OP_HASH160], Mode::Wire).unwrap();
        assert_eq!(decoded, script);

        // Store form swallows the rest of the source.
        let decoded = Script::from_bytes(&[OP_DUP, OP_HASH160], Mode::Store).unwrap();
        assert_eq!(decoded, script);
    }

    #[test]
    fn test_truncated_wire_script() {
        let mut script = Script::from_program(vec![0x01]);
        let mut reader = SliceReader::new(&[0x05, 0x01, 0x02]);

        assert!(script.from_data(&mut reader, Mode::Wire).is_err());
        assert!(script.is_empty());
        assert!(!reader.is_valid());
    }

    #[test]
    fn test_operations_stop_on_truncated_push() {
        let script = Script::from_program(vec![OP_DUP, OP_PUSHDATA1, 0x05, 0x01]);
        let mut ops = script.operations();

        assert_eq!(ops.next().map(|op| op.code), Some(OP_DUP));
        assert_eq!(ops.next(), None);
        assert!(ops.is_malformed());
        assert!(!script.is_well_formed());
    }

    #[test]
    fn test_pushdata_forms() {
        let mut program = vec![OP_PUSHDATA2, 0x03, 0x00, 0xaa, 0xbb, 0xcc];
        program.extend([OP_PUSHDATA4, 0x01, 0x00, 0x00, 0x00, 0xdd]);
        let script = Script::from_program(program);

        let data: Vec<&[u8]> = script.operations().map(|op| op.data).collect();
        assert_eq!(data, vec![&[0xaa, 0xbb, 0xcc][..], &[0xdd][..]]);
        assert!(script.is_push_only());
    }

    #[test]
    fn test_signature_operation_count() {
        let keys = vec![public_key(1), public_key(2), public_key(3)];
        let script = multisig(2, &keys);

        assert_eq!(script.operation_count(true), 3);
        assert_eq!(script.operation_count(false), 20);

        let script = Script::from_program(vec![OP_CHECKSIG, OP_CHECKSIGVERIFY, OP_CHECKMULTISIG]);
        // No key count precedes the multisig.
        assert_eq!(script.operation_count(true), 22);
    }

    #[test]
    fn test_embedded_operation_count() {
        let redeem = multisig(2, &[public_key(1), public_key(2), public_key(3)]);
        let mut program = vec![OP_0];
        program.extend(push(&[0x30; 71]));
        program.extend(push(redeem.program()));
        let input = Script::from_program(program);

        assert_eq!(input.embedded_operation_count(&pay_script_hash()), 3);

        // Not a P2SH spend.
        let prevout = Script::from_program(vec![OP_DUP]);
        assert_eq!(input.embedded_operation_count(&prevout), 0);

        // Not push-only.
        let mut program = input.program().to_vec();
        program.push(OP_DUP);
        let input = Script::from_program(program);
        assert_eq!(input.embedded_operation_count(&pay_script_hash()), 0);
    }

    #[test]
    fn test_output_patterns() {
        let mut program = vec![OP_DUP, OP_HASH160, 20];
        program.extend([0x22; 20]);
        program.extend([OP_EQUALVERIFY, OP_CHECKSIG]);
        let script = Script::from_program(program);
        assert_eq!(script.pattern(), ScriptPattern::PayKeyHash(&[0x22; 20]));

        assert_eq!(pay_script_hash().pattern(), ScriptPattern::PayScriptHash(&[0x11; 20]));

        let key = public_key(9);
        let mut program = push(&key);
        program.push(OP_CHECKSIG);
        let script = Script::from_program(program);
        assert_eq!(script.pattern(), ScriptPattern::PayPublicKey(&key));

        let script = multisig(1, &[public_key(1), public_key(2)]);
        assert_eq!(
            script.pattern(),
            ScriptPattern::PayMultisig {
                required: 1,
                keys: 2
            }
        );

        assert_eq!(
            Script::from_program(vec![OP_RETURN, 0x01, 0x00]).pattern(),
            ScriptPattern::NullData
        );
    }

    #[test]
    fn test_input_patterns() {
        let key = public_key(4);
        let mut program = push(&[0x30; 71]);
        program.extend(push(&key));
        let script = Script::from_program(program);
        assert_eq!(
            script.pattern(),
            ScriptPattern::SignKeyHash { public_key: &key }
        );

        let redeem = multisig(1, &[public_key(1)]);
        let mut program = vec![OP_0];
        program.extend(push(&[0x30; 71]));
        program.extend(push(redeem.program()));
        let script = Script::from_program(program);
        assert_eq!(
            script.pattern(),
            ScriptPattern::SignScriptHash {
                redeem_script: redeem.program()
            }
        );

        assert_eq!(Script::new().pattern(), ScriptPattern::NonStandard);
        assert_eq!(script.pattern().name(), "sign_script_hash");
    }

    #[test]
    fn test_display() {
        let script = Script::from_program(vec![OP_DUP, 0x02, 0xab, 0xcd, OP_1, 0xba]);
        assert_eq!(script.to_string(), "OP_DUP [abcd] 1 0xba");
    }
}
