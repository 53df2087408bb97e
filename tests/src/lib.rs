// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Fixtures and flows for testing the liquid signing engine.
//!
//! Flows are generic over the engine's [Keychain][liquid_signer_core::keychain::Keychain]
//! and [Ui][liquid_signer_core::engine::Ui] for reuse.
//!


pub mod host;

pub mod ui;

pub mod transaction;
