// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Trusted commitment handling
//!
//! Output generators / value commitments in the host-supplied transaction are
//! replaced with the host's trusted commitment data prior to display, then
//! once the prevouts hash is known the commitments are recomputed from
//! keychain derived blinding factors and checked against both the trusted
//! data and the transaction, along with the master key HMAC binding the
//! trusted data to this device.

use byteorder::{ByteOrder, LittleEndian};
use elements::{
    confidential, encode,
    secp256k1_zkp::{Generator, PedersenCommitment, Secp256k1, Signing, Tag, Tweak},
    Transaction, TxOut,
};
use static_assertions::const_assert_eq;
use subtle::ConstantTimeEq;

use super::{Error, TrustedCommitment};
use crate::keychain::{BlindingFactorKind, Keychain, VALUE_COMMITMENT_LEN};

/// Asset id length
pub const ASSET_ID_LEN: usize = 32;

/// Asset generator length
pub const ASSET_GENERATOR_LEN: usize = 33;

/// HMAC blob, `generator || value_commitment || asset_id || value (u64 LE)`
pub const HMAC_BLOB_LEN: usize = ASSET_GENERATOR_LEN + VALUE_COMMITMENT_LEN + ASSET_ID_LEN + 8;

const_assert_eq!(HMAC_BLOB_LEN, 106);

/// Display information derived for each output
#[derive(Clone, PartialEq, Debug, Default)]
pub struct OutputInfo {
    /// Output was blinded in the transaction
    pub is_confidential: bool,
    /// Output pays to a validated change path
    pub is_change: bool,
    /// Asset id (wire byte order)
    pub asset_id: [u8; ASSET_ID_LEN],
    /// Unblinded value
    pub value: u64,
    /// Blinding public key, confidential outputs only
    pub blinding_key: Vec<u8>,
}

/// Derive output information, overwriting confidential output generators and
/// value commitments with the trusted commitment data.
///
/// Returns the fee total (unblinded outputs without script).
pub fn derive_output_info(
    tx: &mut Transaction,
    commitments: &[Option<TrustedCommitment>],
    info: &mut [OutputInfo],
) -> Result<u64, Error> {
    assert_eq!(commitments.len(), tx.output.len());
    assert_eq!(info.len(), tx.output.len());

    let mut fee = 0u64;

    for (index, ((txout, commitment), info)) in tx
        .output
        .iter_mut()
        .zip(commitments)
        .zip(info.iter_mut())
        .enumerate()
    {
        match txout.value {
            confidential::Value::Explicit(value) => {
                let asset = txout.asset.explicit().ok_or(Error::UnblindedAsset)?;
                info.asset_id.copy_from_slice(&encode::serialize(&asset));
                info.value = value;

                if txout.script_pubkey.is_empty() {
                    fee = fee.checked_add(value).ok_or(Error::FeeOverflow)?;
                }
            }
            _ => {
                let commitment = commitment.as_ref().ok_or_else(|| {
                    #[cfg(feature = "log")]
                    log::error!("missing commitments data for output {index}");

                    Error::MissingCommitmentData
                })?;
                add_confidential_output_info(commitment, txout, info)?;
            }
        }

        #[cfg(feature = "log")]
        log::debug!("output {index}: {info:02x?}");
        #[cfg(not(feature = "log"))]
        let _ = index;
    }

    Ok(fee)
}

fn add_confidential_output_info(
    commitment: &TrustedCommitment,
    txout: &mut TxOut,
    info: &mut OutputInfo,
) -> Result<(), Error> {
    let asset = match txout.asset {
        confidential::Asset::Null => None,
        _ => parse_asset_generator(&commitment.asset_generator),
    };
    txout.asset = asset.ok_or(Error::AssetGeneratorUpdate)?;

    let value = match txout.value {
        confidential::Value::Null => None,
        _ => parse_value_commitment(&commitment.value_commitment),
    };
    txout.value = value.ok_or(Error::ValueCommitmentUpdate)?;

    info.is_confidential = true;
    info.asset_id = commitment.asset_id;
    info.value = commitment.value;
    info.blinding_key = commitment.blinding_key.clone();

    Ok(())
}

fn parse_asset_generator(b: &[u8]) -> Option<confidential::Asset> {
    if b.len() != ASSET_GENERATOR_LEN {
        return None;
    }
    match encode::deserialize(b) {
        Ok(a @ confidential::Asset::Confidential(_)) => Some(a),
        _ => None,
    }
}

fn parse_value_commitment(b: &[u8]) -> Option<confidential::Value> {
    if b.len() != VALUE_COMMITMENT_LEN {
        return None;
    }
    match encode::deserialize(b) {
        Ok(v @ confidential::Value::Confidential(_)) => Some(v),
        _ => None,
    }
}

/// Verify every confidential output against blinding factors derived from
/// the prevouts hash, tolerating a single value commitment mismatch per
/// transaction (the balancing output).
pub fn verify_trusted_commitments<K: Keychain>(
    keychain: &K,
    hash_prevouts: &[u8; 32],
    tx: &Transaction,
    commitments: &[Option<TrustedCommitment>],
) -> Result<(), Error> {
    let secp = Secp256k1::signing_only();
    let mut found_odd_vbf = false;

    for (index, (txout, commitment)) in tx.output.iter().zip(commitments).enumerate() {
        if txout.value.is_explicit() {
            continue;
        }

        let commitment = commitment.as_ref().ok_or(Error::MissingCommitmentData)?;

        check_trusted_commitment(
            keychain,
            &secp,
            hash_prevouts,
            index as u32,
            txout,
            commitment,
            &mut found_odd_vbf,
        )?;
    }

    Ok(())
}

fn check_trusted_commitment<K: Keychain, C: Signing>(
    keychain: &K,
    secp: &Secp256k1<C>,
    hash_prevouts: &[u8; 32],
    index: u32,
    txout: &TxOut,
    commitment: &TrustedCommitment,
    found_odd_vbf: &mut bool,
) -> Result<(), Error> {
    // Asset generator, no mismatch tolerated
    let generator = keychain
        .derive_blinding_factor(BlindingFactorKind::Asset, hash_prevouts, index)
        .map_err(|_| Error::AssetGeneratorMismatch)
        .and_then(|abf| {
            asset_generator(secp, &commitment.asset_id, &abf)
                .map_err(|_| Error::AssetGeneratorMismatch)
        })?;

    if !ct_eq(&generator, &commitment.asset_generator)
        || !ct_eq(&generator, &encode::serialize(&txout.asset))
    {
        #[cfg(feature = "log")]
        log::error!("asset generator mismatch at index {index}");

        return Err(Error::AssetGeneratorMismatch);
    }

    // Value commitment, one mismatch tolerated per transaction (failing
    // to compute one is not)
    let value_commitment = keychain
        .derive_blinding_factor(BlindingFactorKind::Value, hash_prevouts, index)
        .map_err(|_| Error::ValueCommitmentMismatch)
        .and_then(|vbf| {
            value_commitment(secp, commitment.value, &generator, &vbf)
                .map_err(|_| Error::ValueCommitmentMismatch)
        })?;

    if !ct_eq(&value_commitment, &commitment.value_commitment)
        || !ct_eq(&value_commitment, &encode::serialize(&txout.value))
    {
        if *found_odd_vbf {
            #[cfg(feature = "log")]
            log::error!("second mismatching vbf/value_commitment at index {index}");

            return Err(Error::ValueCommitmentMismatch);
        }

        #[cfg(feature = "log")]
        log::info!(
            "Found mismatching vbf/value_commitment at index {index} (one is expected per tx)"
        );

        *found_odd_vbf = true;
    }

    // HMAC binding the trusted data to this device
    let asset_generator: &[u8; ASSET_GENERATOR_LEN] = commitment
        .asset_generator
        .as_slice()
        .try_into()
        .map_err(|_| Error::AssetGeneratorUpdate)?;
    let value_commitment: &[u8; VALUE_COMMITMENT_LEN] = commitment
        .value_commitment
        .as_slice()
        .try_into()
        .map_err(|_| Error::ValueCommitmentUpdate)?;

    let blob = hmac_blob(
        asset_generator,
        value_commitment,
        &commitment.asset_id,
        commitment.value,
    );
    let hmac = keychain
        .hmac_with_master_key(&blob)
        .map_err(|_| Error::HmacFailed)?;

    if !ct_eq(&hmac, &commitment.hmac) {
        #[cfg(feature = "log")]
        log::error!("hmac mismatch at index {index}");

        return Err(Error::HmacMismatch);
    }

    Ok(())
}

/// Compute a blinded asset generator
pub fn asset_generator<C: Signing>(
    secp: &Secp256k1<C>,
    asset_id: &[u8; ASSET_ID_LEN],
    abf: &[u8; 32],
) -> Result<[u8; ASSET_GENERATOR_LEN], Error> {
    let abf = Tweak::from_slice(abf).map_err(|_| Error::CommitmentFailed)?;
    let g = Generator::new_blinded(secp, Tag::from(*asset_id), abf);
    Ok(g.serialize())
}

/// Compute a value (pedersen) commitment
pub fn value_commitment<C: Signing>(
    secp: &Secp256k1<C>,
    value: u64,
    generator: &[u8; ASSET_GENERATOR_LEN],
    vbf: &[u8; 32],
) -> Result<[u8; VALUE_COMMITMENT_LEN], Error> {
    let generator = Generator::from_slice(generator).map_err(|_| Error::CommitmentFailed)?;
    let vbf = Tweak::from_slice(vbf).map_err(|_| Error::CommitmentFailed)?;
    let c = PedersenCommitment::new(secp, value, vbf, generator);
    Ok(c.serialize())
}

/// Build the HMAC blob for trusted commitment data
pub fn hmac_blob(
    asset_generator: &[u8; ASSET_GENERATOR_LEN],
    value_commitment: &[u8; VALUE_COMMITMENT_LEN],
    asset_id: &[u8; ASSET_ID_LEN],
    value: u64,
) -> [u8; HMAC_BLOB_LEN] {
    let mut b = [0u8; HMAC_BLOB_LEN];
    let (g, rest) = b.split_at_mut(ASSET_GENERATOR_LEN);
    let (c, rest) = rest.split_at_mut(VALUE_COMMITMENT_LEN);
    let (a, v) = rest.split_at_mut(ASSET_ID_LEN);

    g.copy_from_slice(asset_generator);
    c.copy_from_slice(value_commitment);
    a.copy_from_slice(asset_id);
    LittleEndian::write_u64(v, value);

    b
}

fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
