// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Liquid hardware wallet core
//!
//! This provides a common [Engine][engine::Engine] supporting confidential (Liquid / Elements)
//! transaction signing for execution on hardware wallets.
//!
//! Interactions with the engine are performed via host [Message][engine::Message]s
//! carrying [Event][engine::Event]s, with [Reply][engine::Reply]s containing
//! [Output][engine::Output]s returned to the host. Wire decoding of host messages
//! is left to the platform.
//!
//! ## Operations
//!
//! ### Signing a confidential transaction
//!
//! 1. Host issues `sign_liquid_tx` with the serialized transaction, the number of inputs,
//!    one trusted commitment record per output and (optionally) change paths
//! 2. The engine overwrites output generators / value commitments with the trusted values,
//!    displays the outputs and awaits user confirmation
//! 3. On acceptance the engine acknowledges the request, then receives one `tx_input`
//!    message per input, replying with a signer commitment when anti-exfil signing is in use
//! 4. Once all inputs have been streamed the engine re-derives each output's blinding
//!    factors from the prevouts hash and verifies the trusted commitments
//! 5. The user confirms the fee, after which the engine returns one signature per input,
//!    either directly (legacy ECDSA) or in response to `get_signature` messages carrying
//!    host entropy (anti-exfil, see [keychain::anti_exfil])
//!
//! Any failure produces a single rejection [Output::Reject][engine::Output::Reject],
//! addressed to the message being processed when the failure occurred.

pub mod engine;

pub mod gate;

pub mod helpers;

pub mod keychain;

pub mod network;
pub use network::{Network, NetworkType};
