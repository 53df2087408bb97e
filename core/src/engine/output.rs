// Copyright (c) 2022-2023 The MobileCoin Foundation

use heapless::Vec;

use super::{Error, ErrorCode, MessageId};
use crate::keychain::SIGNER_COMMITMENT_LEN;

/// [`Engine`][super::Engine] outputs, returned to the host as [Reply] payloads
#[derive(Clone, PartialEq, Debug)]
pub enum Output {
    /// Request accepted, host should stream inputs
    Ok,

    /// Anti-exfil signer commitment, empty for inputs not being signed
    SignerCommitment(Vec<u8, SIGNER_COMMITMENT_LEN>),

    /// DER signature with sighash byte, empty for inputs not being signed
    Signature(std::vec::Vec<u8>),

    /// Request rejected
    Reject {
        code: ErrorCode,
        message: std::string::String,
    },
}

impl Output {
    /// Build a rejection output for an error
    pub fn reject(e: &Error) -> Self {
        Output::Reject {
            code: e.code(),
            message: e.to_string(),
        }
    }
}

/// Reply to a host message
#[derive(Clone, PartialEq, Debug)]
pub struct Reply {
    pub id: MessageId,
    pub output: Output,
}

impl Reply {
    /// Create a new reply
    pub fn new(id: MessageId, output: Output) -> Self {
        Self { id, output }
    }

    /// Create a rejection reply
    pub fn reject(id: MessageId, e: &Error) -> Self {
        Self::new(id, Output::reject(e))
    }
}
