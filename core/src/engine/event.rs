// Copyright (c) 2022-2023 The MobileCoin Foundation

use heapless::String;
use strum::{Display, EnumVariantNames};

/// Maximum correlation id length
pub const MAX_ID_LEN: usize = 16;

/// Host correlation id, echoed back in replies
pub type MessageId = String<MAX_ID_LEN>;

/// Host message, an [Event] with its correlation id
#[derive(Clone, PartialEq, Debug)]
pub struct Message {
    pub id: MessageId,
    pub event: Event,
}

impl Message {
    /// Create a new message
    pub fn new(id: MessageId, event: impl Into<Event>) -> Self {
        Self {
            id,
            event: event.into(),
        }
    }
}

/// [`Engine`][super::Engine] input events, decoded from host messages
#[derive(Clone, PartialEq, Debug, Display, EnumVariantNames)]
#[strum(serialize_all = "snake_case")]
pub enum Event {
    /// Start a signing session
    SignLiquidTx(SignLiquidTx),

    /// Per-input data, one per transaction input
    TxInput(TxInput),

    /// Anti-exfil signature request, one per transaction input
    GetSignature(GetSignature),
}

/// Signing session request
#[derive(Clone, PartialEq, Debug, Default)]
pub struct SignLiquidTx {
    /// Network name
    pub network: std::string::String,
    /// Serialized (elements consensus encoded) transaction
    pub txn: Vec<u8>,
    /// Declared number of inputs
    pub num_inputs: usize,
    /// One trusted commitment per output, `None` for unblinded outputs
    pub trusted_commitments: Vec<Option<TrustedCommitment>>,
    /// Use anti-exfil signatures
    pub use_ae_signatures: bool,
    /// Optional change paths, one per output
    pub change: Option<Vec<Option<Vec<u32>>>>,
}

/// Host-supplied commitment data for a blinded output
#[derive(Clone, PartialEq, Debug, Default)]
pub struct TrustedCommitment {
    /// Asset id (wire byte order)
    pub asset_id: [u8; 32],
    /// Unblinded value
    pub value: u64,
    /// Output blinding public key
    pub blinding_key: Vec<u8>,
    /// Asset generator
    pub asset_generator: Vec<u8>,
    /// Value commitment
    pub value_commitment: Vec<u8>,
    /// HMAC over the commitment data, from a prior call with this device
    pub hmac: [u8; 32],
}

/// Per-input message
#[derive(Clone, PartialEq, Debug, Default)]
pub struct TxInput {
    pub is_witness: Option<bool>,
    pub path: Option<Vec<u32>>,
    pub script: Option<Vec<u8>>,
    pub ae_host_commitment: Option<Vec<u8>>,
    pub value_commitment: Option<Vec<u8>>,
}

/// Anti-exfil signature request
#[derive(Clone, PartialEq, Debug, Default)]
pub struct GetSignature {
    pub ae_host_entropy: Option<Vec<u8>>,
}

impl From<SignLiquidTx> for Event {
    fn from(v: SignLiquidTx) -> Self {
        Event::SignLiquidTx(v)
    }
}

impl From<TxInput> for Event {
    fn from(v: TxInput) -> Self {
        Event::TxInput(v)
    }
}

impl From<GetSignature> for Event {
    fn from(v: GetSignature) -> Self {
        Event::GetSignature(v)
    }
}
