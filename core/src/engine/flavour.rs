// Copyright (c) 2022-2023 The MobileCoin Foundation

use strum::Display;

const OP_0: u8 = 0x00;
const OP_1: u8 = 0x51;
const OP_16: u8 = 0x60;
const OP_DUP: u8 = 0x76;
const OP_HASH160: u8 = 0xa9;
const OP_EQUAL: u8 = 0x87;
const OP_EQUALVERIFY: u8 = 0x88;
const OP_CHECKSIG: u8 = 0xac;
const OP_CHECKMULTISIG: u8 = 0xae;
const PUSH_20: u8 = 0x14;

/// Script flavour, classified per signed input and folded across the transaction
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Display)]
pub enum ScriptFlavour {
    /// No signed inputs seen
    #[default]
    None,
    /// Single signature (p2pkh, p2wpkh, p2sh)
    SingleSig,
    /// Bare m-of-n multisig
    MultiSig,
    /// Anything else (eg. csv or 2of2 service scripts)
    Other,
    /// Signed inputs of differing flavours
    Mixed,
}

impl ScriptFlavour {
    /// Classify a script
    pub fn of_script(script: &[u8]) -> Self {
        if is_p2pkh(script) || is_p2wpkh(script) || is_p2sh(script) {
            ScriptFlavour::SingleSig
        } else if is_multisig(script) {
            ScriptFlavour::MultiSig
        } else {
            ScriptFlavour::Other
        }
    }

    /// Fold the next signed input's flavour into the aggregate
    pub fn aggregate(self, next: Self) -> Self {
        match self {
            ScriptFlavour::None => next,
            v if v == next => v,
            _ => ScriptFlavour::Mixed,
        }
    }
}

fn is_p2pkh(s: &[u8]) -> bool {
    s.len() == 25
        && s[0] == OP_DUP
        && s[1] == OP_HASH160
        && s[2] == PUSH_20
        && s[23] == OP_EQUALVERIFY
        && s[24] == OP_CHECKSIG
}

fn is_p2wpkh(s: &[u8]) -> bool {
    s.len() == 22 && s[0] == OP_0 && s[1] == PUSH_20
}

fn is_p2sh(s: &[u8]) -> bool {
    s.len() == 23 && s[0] == OP_HASH160 && s[1] == PUSH_20 && s[22] == OP_EQUAL
}

fn is_multisig(s: &[u8]) -> bool {
    if s.len() < 3 {
        return false;
    }
    let (m, n) = (s[0], s[s.len() - 2]);

    s[s.len() - 1] == OP_CHECKMULTISIG
        && (OP_1..=OP_16).contains(&m)
        && (OP_1..=OP_16).contains(&n)
        && m <= n
}
