// Copyright (c) 2022-2023 The MobileCoin Foundation

use num_enum::TryFromPrimitive;
use strum::Display;

/// Rejection codes returned to the host
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display, TryFromPrimitive)]
#[repr(i32)]
pub enum ErrorCode {
    /// User declined at a confirmation checkpoint
    UserCancelled = -32000,
    /// Message received out of the expected sequence
    ProtocolError = -32001,
    /// Network type inconsistent with prior usage
    NetworkMismatch = -32003,
    /// Malformed or inconsistent request
    BadParameters = -32602,
    /// Cryptographic primitive failure
    InternalError = -32603,
}

/// [Engine][super::Engine] errors, each results in a single rejection to the host
#[derive(Copy, Clone, PartialEq, Eq, Debug, thiserror::Error)]
pub enum Error {
    /// Network name not recognised
    #[error("Invalid network")]
    InvalidNetwork,

    /// Network type differs from the restriction set by prior usage
    #[error("Network type inconsistent with prior usage")]
    NetworkMismatch,

    /// Signing request for a non-liquid network
    #[error("sign_liquid_tx call only appropriate for liquid network")]
    NotLiquidNetwork,

    /// Missing transaction bytes
    #[error("Failed to extract txn from parameters")]
    MissingTransaction,

    /// Transaction bytes failed to parse
    #[error("Failed to extract tx from passed bytes")]
    InvalidTransaction,

    /// Declared input count zero or missing
    #[error("Failed to extract valid number of inputs from parameters")]
    InvalidInputCount,

    /// Declared input count differs from the transaction
    #[error("Unexpected number of inputs for transaction")]
    InputCountMismatch,

    /// Missing trusted commitments
    #[error("Failed to extract trusted commitments from parameters")]
    MissingCommitments,

    /// Trusted commitment count differs from the output count
    #[error("Unexpected number of trusted commitments for transaction")]
    CommitmentCountMismatch,

    /// Change path count differs from the output count
    #[error("Unexpected number of output change info elements")]
    ChangeCountMismatch,

    /// Change path invalid or not matching the output script
    #[error("Failed to verify change output")]
    ChangeMismatch,

    /// Confidential output without trusted commitment
    #[error("Missing commitments data for blinded output")]
    MissingCommitmentData,

    /// Trusted asset generator missing, wrong length or not a valid generator
    #[error("Failed to update tx asset_generator from commitments data")]
    AssetGeneratorUpdate,

    /// Trusted value commitment missing, wrong length or not a valid commitment
    #[error("Failed to update tx value_commitment from commitments data")]
    ValueCommitmentUpdate,

    /// Plaintext output with a non-explicit asset
    #[error("Unexpected asset for unblinded output")]
    UnblindedAsset,

    /// Fee total overflow
    #[error("Invalid fee total")]
    FeeOverflow,

    /// User declined at a confirmation checkpoint
    #[error("User declined to sign transaction")]
    UserDeclined,

    /// Expected a `tx_input` message
    #[error("Unexpected message, expecting 'tx_input'")]
    ExpectedTxInput,

    /// Expected a `get_signature` message
    #[error("Unexpected message, expecting 'get_signature'")]
    ExpectedGetSignature,

    /// Session message received outside of a session
    #[error("Unexpected message outside of signing session")]
    UnexpectedEvent,

    /// Missing witness flag
    #[error("Failed to extract is_witness from parameters")]
    MissingIsWitness,

    /// Path empty or too long
    #[error("Failed to extract valid path from parameters")]
    InvalidPath,

    /// Anti-exfil host commitment missing or wrong length
    #[error("Failed to extract valid host commitment from parameters")]
    InvalidHostCommitment,

    /// Missing or empty script for a signed input
    #[error("Failed to extract script from parameters")]
    MissingScript,

    /// Witness input value commitment missing or wrong length
    #[error("Failed to extract value commitment from parameters")]
    InvalidValueCommitment,

    /// Signing fields supplied for an input without path
    #[error("Unexpected signing parameters for input without path")]
    UnexpectedSigningFields,

    /// Anti-exfil host entropy missing or wrong length
    #[error("Failed to extract valid host entropy from parameters")]
    InvalidHostEntropy,

    /// Anti-exfil host entropy does not match the host commitment
    #[error("Failed to verify host entropy against host commitment")]
    HostEntropyMismatch,

    /// Signature hash computation failed
    #[error("Failed to make tx input hash")]
    InputHashFailed,

    /// Signer commitment computation failed
    #[error("Failed to make ae signer commitment")]
    SignerCommitmentFailed,

    /// Generator or commitment computation failed
    #[error("Failed to compute commitments")]
    CommitmentFailed,

    /// Master key HMAC failed
    #[error("Failed to compute hmac")]
    HmacFailed,

    /// Signing failed
    #[error("Failed to sign tx input")]
    SignFailed,

    /// Recomputed asset generator differs
    #[error("Failed to verify asset_generator from commitments data")]
    AssetGeneratorMismatch,

    /// Second recomputed value commitment mismatch
    #[error("Failed to verify value_commitment from commitments data")]
    ValueCommitmentMismatch,

    /// Recomputed HMAC differs
    #[error("Failed to verify hmac from commitments data")]
    HmacMismatch,
}

impl Error {
    /// Rejection code for this error
    pub const fn code(&self) -> ErrorCode {
        use Error::*;

        match self {
            NetworkMismatch => ErrorCode::NetworkMismatch,
            UserDeclined => ErrorCode::UserCancelled,
            ExpectedTxInput | ExpectedGetSignature | UnexpectedEvent => ErrorCode::ProtocolError,
            InputHashFailed | SignerCommitmentFailed | CommitmentFailed
            | HmacFailed | SignFailed => ErrorCode::InternalError,
            _ => ErrorCode::BadParameters,
        }
    }
}
