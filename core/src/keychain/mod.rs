// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Keychain collaborator, owns master key material and performs all
//! secret-dependent derivation and signing on behalf of the engine.

use elements::Transaction;
use strum::Display;
use zeroize::Zeroizing;

pub mod anti_exfil;

mod soft;
pub use soft::SoftKeychain;

/// Signature hash length
pub const SIGNATURE_HASH_LEN: usize = 32;

/// Anti-exfil host commitment length
pub const HOST_COMMITMENT_LEN: usize = 32;

/// Anti-exfil host entropy length
pub const HOST_ENTROPY_LEN: usize = 32;

/// Anti-exfil signer commitment length (compressed point)
pub const SIGNER_COMMITMENT_LEN: usize = 33;

/// Value commitment length
pub const VALUE_COMMITMENT_LEN: usize = 33;

/// Blinding factor length
pub const BLINDING_FACTOR_LEN: usize = 32;

/// Master key HMAC length
pub const HMAC_LEN: usize = 32;

/// Secret blinding factor, cleared on drop
pub type BlindingFactor = Zeroizing<[u8; BLINDING_FACTOR_LEN]>;

/// Blinding factor kinds
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display)]
pub enum BlindingFactorKind {
    /// Asset blinding factor
    Asset,
    /// Value blinding factor
    Value,
}

/// Keychain errors
#[derive(Copy, Clone, PartialEq, Eq, Debug, thiserror::Error)]
pub enum Error {
    /// Seed length outside of the BIP32 bounds
    #[error("invalid seed length")]
    InvalidSeed,

    /// Key derivation failed
    #[error("key derivation failed")]
    Derivation,

    /// Input index out of range for transaction
    #[error("input index out of range")]
    InvalidIndex,

    /// Witness input without value commitment
    #[error("missing value commitment")]
    MissingValueCommitment,

    /// Decoding of a transaction field failed
    #[error("encoding error")]
    Encoding,

    /// Curve operation failed
    #[error("secp256k1 error")]
    Secp,

    /// Anti-exfil host entropy does not open the host commitment
    #[error("host entropy mismatch")]
    HostEntropyMismatch,
}

/// [`Keychain`] trait provides key operations for [`Engine`][crate::engine::Engine] instances
pub trait Keychain {
    /// Compute the signature hash (SIGHASH_ALL) for a transaction input,
    /// witness inputs require the value commitment of the spent output
    fn derive_signature_hash(
        &self,
        tx: &Transaction,
        index: usize,
        is_witness: bool,
        script: &[u8],
        value_commitment: Option<&[u8; VALUE_COMMITMENT_LEN]>,
    ) -> Result<[u8; SIGNATURE_HASH_LEN], Error>;

    /// Compute the anti-exfil signer commitment (public nonce) for a
    /// signature hash and host commitment
    fn derive_signer_commitment(
        &self,
        path: &[u32],
        signature_hash: &[u8; SIGNATURE_HASH_LEN],
        host_commitment: &[u8; HOST_COMMITMENT_LEN],
    ) -> Result<[u8; SIGNER_COMMITMENT_LEN], Error>;

    /// Derive the asset or value blinding factor for an output
    fn derive_blinding_factor(
        &self,
        kind: BlindingFactorKind,
        hash_prevouts: &[u8; 32],
        output_index: u32,
    ) -> Result<BlindingFactor, Error>;

    /// HMAC-SHA256 keyed with the master key
    fn hmac_with_master_key(&self, data: &[u8]) -> Result<[u8; HMAC_LEN], Error>;

    /// Sign a signature hash, returning a DER signature with sighash byte
    fn sign(&self, path: &[u32], signature_hash: &[u8; SIGNATURE_HASH_LEN])
        -> Result<Vec<u8>, Error>;

    /// Sign a signature hash with the committed nonce tweaked by the host
    /// entropy, see [anti_exfil]. Fails with [Error::HostEntropyMismatch]
    /// where the entropy does not match the host commitment.
    fn sign_anti_exfil(
        &self,
        path: &[u32],
        signature_hash: &[u8; SIGNATURE_HASH_LEN],
        host_commitment: &[u8; HOST_COMMITMENT_LEN],
        host_entropy: &[u8; HOST_ENTROPY_LEN],
    ) -> Result<Vec<u8>, Error>;

    /// Derive the wallet output script for a path
    fn derive_script(&self, path: &[u32]) -> Result<Vec<u8>, Error>;
}

impl<T: Keychain> Keychain for &T {
    fn derive_signature_hash(
        &self,
        tx: &Transaction,
        index: usize,
        is_witness: bool,
        script: &[u8],
        value_commitment: Option<&[u8; VALUE_COMMITMENT_LEN]>,
    ) -> Result<[u8; SIGNATURE_HASH_LEN], Error> {
        T::derive_signature_hash(self, tx, index, is_witness, script, value_commitment)
    }

    fn derive_signer_commitment(
        &self,
        path: &[u32],
        signature_hash: &[u8; SIGNATURE_HASH_LEN],
        host_commitment: &[u8; HOST_COMMITMENT_LEN],
    ) -> Result<[u8; SIGNER_COMMITMENT_LEN], Error> {
        T::derive_signer_commitment(self, path, signature_hash, host_commitment)
    }

    fn derive_blinding_factor(
        &self,
        kind: BlindingFactorKind,
        hash_prevouts: &[u8; 32],
        output_index: u32,
    ) -> Result<BlindingFactor, Error> {
        T::derive_blinding_factor(self, kind, hash_prevouts, output_index)
    }

    fn hmac_with_master_key(&self, data: &[u8]) -> Result<[u8; HMAC_LEN], Error> {
        T::hmac_with_master_key(self, data)
    }

    fn sign(
        &self,
        path: &[u32],
        signature_hash: &[u8; SIGNATURE_HASH_LEN],
    ) -> Result<Vec<u8>, Error> {
        T::sign(self, path, signature_hash)
    }

    fn sign_anti_exfil(
        &self,
        path: &[u32],
        signature_hash: &[u8; SIGNATURE_HASH_LEN],
        host_commitment: &[u8; HOST_COMMITMENT_LEN],
        host_entropy: &[u8; HOST_ENTROPY_LEN],
    ) -> Result<Vec<u8>, Error> {
        T::sign_anti_exfil(self, path, signature_hash, host_commitment, host_entropy)
    }

    fn derive_script(&self, path: &[u32]) -> Result<Vec<u8>, Error> {
        T::derive_script(self, path)
    }
}
