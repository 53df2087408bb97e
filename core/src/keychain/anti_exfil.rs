// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Sign-to-contract anti-exfil protocol
//!
//! 1. The host picks 32 bytes of entropy and sends [host_commitment] of it
//!    with each input.
//! 2. The signer derives a deterministic nonce `k` and returns the signer
//!    commitment `R = k·G`.
//! 3. The host reveals its entropy, the signer checks it against the host
//!    commitment and signs with nonce `k + H(R, entropy)`.
//!
//! The public nonce of the signature is therefore `R + H(R, entropy)·G`,
//! which the host checks with [verify_commitment_opening] before accepting
//! the signature.

use elements::bitcoin::secp256k1::{
    constants::CURVE_ORDER, ecdsa::Signature, All, PublicKey, Scalar, Secp256k1, SecretKey,
};
use sha2::{Digest, Sha256};

use super::{Error, HOST_COMMITMENT_LEN, HOST_ENTROPY_LEN, SIGNATURE_HASH_LEN, SIGNER_COMMITMENT_LEN};

/// Tag for the host entropy commitment
const TAG_HOST_DATA: &[u8] = b"s2c/ecdsa/data";
/// Tag for the nonce tweak committing to the host entropy
const TAG_NONCE_TWEAK: &[u8] = b"s2c/ecdsa/point";

/// Commitment the host sends ahead of revealing its entropy
pub fn host_commitment(host_entropy: &[u8; HOST_ENTROPY_LEN]) -> [u8; HOST_COMMITMENT_LEN] {
    tagged_hash(TAG_HOST_DATA, &[&host_entropy[..]])
}

/// Nonce tweak `H(R, entropy)` applied to the committed signer nonce
pub fn nonce_tweak(
    signer_commitment: &[u8; SIGNER_COMMITMENT_LEN],
    host_entropy: &[u8; HOST_ENTROPY_LEN],
) -> [u8; 32] {
    tagged_hash(TAG_NONCE_TWEAK, &[&signer_commitment[..], &host_entropy[..]])
}

/// Check the public nonce of a signature (DER with trailing sighash byte)
/// is the signer commitment tweaked by the host entropy
pub fn verify_commitment_opening(
    signer_commitment: &[u8; SIGNER_COMMITMENT_LEN],
    host_entropy: &[u8; HOST_ENTROPY_LEN],
    signature: &[u8],
) -> bool {
    let secp = Secp256k1::verification_only();

    let der = match signature.split_last() {
        Some((_sighash, der)) => der,
        None => return false,
    };
    let sig = match Signature::from_der(der) {
        Ok(s) => s,
        Err(_) => return false,
    };

    let tweak = match Scalar::from_be_bytes(nonce_tweak(signer_commitment, host_entropy)) {
        Ok(t) => t,
        Err(_) => return false,
    };
    let nonce_point = match PublicKey::from_slice(&signer_commitment[..])
        .and_then(|r| r.add_exp_tweak(&secp, &tweak))
    {
        Ok(p) => p,
        Err(_) => return false,
    };

    sig.serialize_compact()[..32] == reduce(&nonce_point.serialize()[1..])[..]
}

/// ECDSA signature over a signature hash using an explicit nonce,
/// normalised to low-s
pub(crate) fn sign_with_nonce(
    secp: &Secp256k1<All>,
    sk: &SecretKey,
    nonce: &SecretKey,
    signature_hash: &[u8; SIGNATURE_HASH_LEN],
) -> Result<Signature, Error> {
    // r = x(k·G) mod n
    let nonce_point = PublicKey::from_secret_key(secp, nonce).serialize();
    let r = reduce(&nonce_point[1..]);
    let r_scalar = Scalar::from_be_bytes(r).map_err(|_| Error::Secp)?;

    let z = Scalar::from_be_bytes(reduce(&signature_hash[..])).map_err(|_| Error::Secp)?;

    // s = k^-1 (z + r·d)
    let mut k_inv = invert(nonce)?;
    let s = sk
        .mul_tweak(&r_scalar)
        .and_then(|rd| rd.add_tweak(&z))
        .and_then(|v| v.mul_tweak(&Scalar::from(k_inv)));
    k_inv.non_secure_erase();
    let mut s = s.map_err(|_| Error::Secp)?;

    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(&r);
    compact[32..].copy_from_slice(&s.secret_bytes());
    s.non_secure_erase();

    let mut sig = Signature::from_compact(&compact).map_err(|_| Error::Secp)?;
    sig.normalize_s();

    Ok(sig)
}

/// Modular inverse `k^(n-2) mod n`
fn invert(k: &SecretKey) -> Result<SecretKey, Error> {
    // Low byte of the group order is 0x41, no borrow
    let mut exponent = CURVE_ORDER;
    exponent[31] -= 2;

    let base = Scalar::from(*k);
    let mut acc: Option<SecretKey> = None;

    for byte in exponent {
        for bit in (0..8).rev() {
            if let Some(a) = acc {
                acc = Some(a.mul_tweak(&Scalar::from(a)).map_err(|_| Error::Secp)?);
            }
            if (byte >> bit) & 1 == 1 {
                acc = Some(match acc {
                    Some(a) => a.mul_tweak(&base).map_err(|_| Error::Secp)?,
                    None => *k,
                });
            }
        }
    }

    acc.ok_or(Error::Secp)
}

/// Reduce a 32 byte big-endian value modulo the group order
fn reduce(v: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&v[..32]);

    // Inputs are below 2^256 < 2n, a single subtraction suffices
    if out >= CURVE_ORDER {
        let mut borrow = 0u16;
        for i in (0..32).rev() {
            let d = out[i] as u16 + 0x100 - CURVE_ORDER[i] as u16 - borrow;
            out[i] = d as u8;
            borrow = if d < 0x100 { 1 } else { 0 };
        }
    }

    out
}

fn tagged_hash(tag: &[u8], parts: &[&[u8]]) -> [u8; 32] {
    let tag = Sha256::digest(tag);

    let mut h = Sha256::new();
    h.update(tag);
    h.update(tag);
    for p in parts {
        h.update(p);
    }
    h.finalize().into()
}
