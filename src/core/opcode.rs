//! Script opcodes
//!
//! Only the opcodes the input model needs to recognize are named here:
//! push operations, the signature checks that are metered as sigops, and
//! the building blocks of the standard payment patterns.

pub const OP_0: u8 = 0x00;
/// Largest opcode that pushes its own value as a length
pub const OP_PUSHBYTES_75: u8 = 0x4b;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1NEGATE: u8 = 0x4f;
pub const OP_RESERVED: u8 = 0x50;
pub const OP_1: u8 = 0x51;
pub const OP_16: u8 = 0x60;
pub const OP_RETURN: u8 = 0x6a;
pub const OP_DUP: u8 = 0x76;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_CHECKSIGVERIFY: u8 = 0xad;
pub const OP_CHECKMULTISIG: u8 = 0xae;
pub const OP_CHECKMULTISIGVERIFY: u8 = 0xaf;

/// OP_1 through OP_16
pub fn is_positive(code: u8) -> bool {
    (OP_1..=OP_16).contains(&code)
}

/// Numeric value of OP_1 through OP_16
pub fn to_positive(code: u8) -> Option<u8> {
    is_positive(code).then(|| code - OP_1 + 1)
}

/// Data pushes, small integers and OP_RESERVED
pub fn is_push(code: u8) -> bool {
    code <= OP_16
}

/// Signature checks counted by the sigop meter
pub fn is_signature_check(code: u8) -> bool {
    code == OP_CHECKSIG || code == OP_CHECKSIGVERIFY
}

pub fn is_multisig_check(code: u8) -> bool {
    code == OP_CHECKMULTISIG || code == OP_CHECKMULTISIGVERIFY
}

/// Mnemonic for display, `None` for opcodes not named here
pub fn name(code: u8) -> Option<&'static str> {
    let name = match code {
        OP_0 => "OP_0",
        OP_PUSHDATA1 => "OP_PUSHDATA1",
        OP_PUSHDATA2 => "OP_PUSHDATA2",
        OP_PUSHDATA4 => "OP_PUSHDATA4",
        OP_1NEGATE => "OP_1NEGATE",
        OP_RESERVED => "OP_RESERVED",
        OP_RETURN => "OP_RETURN",
        OP_DUP => "OP_DUP",
        OP_EQUAL => "OP_EQUAL",
        OP_EQUALVERIFY => "OP_EQUALVERIFY",
        OP_HASH160 => "OP_HASH160",
        OP_CHECKSIG => "OP_CHECKSIG",
        OP_CHECKSIGVERIFY => "OP_CHECKSIGVERIFY",
        OP_CHECKMULTISIG => "OP_CHECKMULTISIG",
        OP_CHECKMULTISIGVERIFY => "OP_CHECKMULTISIGVERIFY",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_numbers() {
        assert_eq!(to_positive(OP_1), Some(1));
        assert_eq!(to_positive(OP_16), Some(16));
        assert_eq!(to_positive(OP_0), None);
        assert_eq!(to_positive(OP_1NEGATE), None);
    }

    #[test]
    fn test_push_classification() {
        assert!(is_push(OP_0));
        assert!(is_push(OP_PUSHDATA4));
        assert!(is_push(OP_RESERVED));
        assert!(is_push(OP_16));
        assert!(!is_push(OP_DUP));
        assert!(is_multisig_check(OP_CHECKMULTISIGVERIFY));
        assert!(!is_signature_check(OP_CHECKMULTISIG));
        assert_eq!(name(OP_HASH160), Some("OP_HASH160"));
    }
}
