// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Seed-backed software keychain
//!
//! Signing keys are BIP32 derived from the seed, blinding factors follow
//! SLIP-0077 (master blinding key from the seed, per-transaction key from
//! the prevouts hash), and the commitments HMAC key is HKDF-derived from
//! the seed. All secret material is cleared on drop.

use byteorder::{BigEndian, ByteOrder};
use elements::{
    bitcoin::{
        bip32::{ChildNumber, Xpriv},
        secp256k1::{ecdsa::Signature, All, Message, PublicKey, Scalar, Secp256k1, SecretKey},
        NetworkKind,
    },
    confidential, encode,
    hashes::{hash160, Hash},
    sighash::SighashCache,
    EcdsaSighashType, Script, Transaction,
};
use hkdf::{
    hmac::{Hmac, Mac},
    Hkdf,
};
use rand_core::CryptoRngCore;
use sha2::{Sha256, Sha512};
use zeroize::{Zeroize, Zeroizing};

use super::{
    anti_exfil, BlindingFactor, BlindingFactorKind, Error, Keychain, BLINDING_FACTOR_LEN, HMAC_LEN,
    HOST_COMMITMENT_LEN, HOST_ENTROPY_LEN, SIGNATURE_HASH_LEN, SIGNER_COMMITMENT_LEN,
    VALUE_COMMITMENT_LEN,
};

const SEED_MIN_LEN: usize = 16;
const SEED_MAX_LEN: usize = 64;

/// SLIP-0021 root key label
const SLIP21_ROOT_LABEL: &[u8] = b"Symmetric key seed";
/// SLIP-0077 node label
const SLIP77_LABEL: &[u8] = b"SLIP-0077";

const HKDF_SALT: &[u8] = b"liquid-signer";
const HKDF_INFO_COMMITMENTS: &[u8] = b"commitments-hmac";

const ABF_LABEL: &[u8] = b"ABF";
const VBF_LABEL: &[u8] = b"VBF";

/// SIGHASH_ALL byte appended to DER signatures
const SIGHASH_ALL: u8 = 0x01;

/// Software [Keychain] derived from a BIP32 seed
pub struct SoftKeychain {
    seed: Zeroizing<Vec<u8>>,
    master_blinding_key: [u8; BLINDING_FACTOR_LEN],
    hmac_key: [u8; HMAC_LEN],
    secp: Secp256k1<All>,
}

impl SoftKeychain {
    /// Create a keychain from a BIP32 seed (16 to 64 bytes)
    pub fn from_seed(seed: &[u8]) -> Result<Self, Error> {
        if !(SEED_MIN_LEN..=SEED_MAX_LEN).contains(&seed.len()) {
            return Err(Error::InvalidSeed);
        }

        // SLIP-0021 root, then the SLIP-0077 node (label prefixed by a zero byte)
        let mut root = hmac_sha512(SLIP21_ROOT_LABEL, &[seed])?;
        let mut node = hmac_sha512(&root[..32], &[&[0x00][..], SLIP77_LABEL])?;

        let mut master_blinding_key = [0u8; BLINDING_FACTOR_LEN];
        master_blinding_key.copy_from_slice(&node[32..]);

        root.zeroize();
        node.zeroize();

        let mut hmac_key = [0u8; HMAC_LEN];
        Hkdf::<Sha256>::new(Some(HKDF_SALT), seed)
            .expand(HKDF_INFO_COMMITMENTS, &mut hmac_key)
            .map_err(|_| Error::Derivation)?;

        Ok(Self {
            seed: Zeroizing::new(seed.to_vec()),
            master_blinding_key,
            hmac_key,
            secp: Secp256k1::new(),
        })
    }

    /// Create a keychain with a random seed
    pub fn generate<R: CryptoRngCore>(rng: &mut R) -> Result<Self, Error> {
        let mut seed = Zeroizing::new([0u8; SEED_MAX_LEN]);
        rng.fill_bytes(&mut seed[..]);
        Self::from_seed(&seed[..])
    }

    /// Fetch the public key for a derivation path
    pub fn public_key(&self, path: &[u32]) -> Result<PublicKey, Error> {
        let mut sk = self.derive_private_key(path)?;
        let pk = PublicKey::from_secret_key(&self.secp, &sk);
        sk.non_secure_erase();
        Ok(pk)
    }

    fn derive_private_key(&self, path: &[u32]) -> Result<SecretKey, Error> {
        let master =
            Xpriv::new_master(NetworkKind::Main, &self.seed).map_err(|_| Error::Derivation)?;

        let path: Vec<ChildNumber> = path.iter().map(|n| ChildNumber::from(*n)).collect();
        let child = master
            .derive_priv(&self.secp, &path)
            .map_err(|_| Error::Derivation)?;

        Ok(child.private_key)
    }

    /// Sign with the committed nonce `k` tweaked to `k + H(k·G, entropy)`
    fn sign_committed(
        &self,
        sk: &SecretKey,
        signature_hash: &[u8; SIGNATURE_HASH_LEN],
        host_commitment: &[u8; HOST_COMMITMENT_LEN],
        host_entropy: &[u8; HOST_ENTROPY_LEN],
    ) -> Result<Signature, Error> {
        let mut nonce = anti_exfil_nonce(sk, signature_hash, host_commitment)?;
        let commitment = PublicKey::from_secret_key(&self.secp, &nonce).serialize();

        let tweaked = Scalar::from_be_bytes(anti_exfil::nonce_tweak(&commitment, host_entropy))
            .map_err(|_| Error::Secp)
            .and_then(|t| nonce.add_tweak(&t).map_err(|_| Error::Secp));
        nonce.non_secure_erase();

        let mut tweaked = tweaked?;
        let sig = anti_exfil::sign_with_nonce(&self.secp, sk, &tweaked, signature_hash);
        tweaked.non_secure_erase();

        sig
    }
}

impl Drop for SoftKeychain {
    fn drop(&mut self) {
        self.master_blinding_key.zeroize();
        self.hmac_key.zeroize();
    }
}

impl Keychain for SoftKeychain {
    fn derive_signature_hash(
        &self,
        tx: &Transaction,
        index: usize,
        is_witness: bool,
        script: &[u8],
        value_commitment: Option<&[u8; VALUE_COMMITMENT_LEN]>,
    ) -> Result<[u8; SIGNATURE_HASH_LEN], Error> {
        if index >= tx.input.len() {
            return Err(Error::InvalidIndex);
        }

        let script = Script::from(script.to_vec());
        let mut cache = SighashCache::new(tx);

        let sighash = match is_witness {
            true => {
                let vc = value_commitment.ok_or(Error::MissingValueCommitment)?;
                let value: confidential::Value =
                    encode::deserialize(&vc[..]).map_err(|_| Error::Encoding)?;
                cache.segwitv0_sighash(index, &script, value, EcdsaSighashType::All)
            }
            false => cache.legacy_sighash(index, &script, EcdsaSighashType::All),
        };

        Ok(sighash.to_byte_array())
    }

    fn derive_signer_commitment(
        &self,
        path: &[u32],
        signature_hash: &[u8; SIGNATURE_HASH_LEN],
        host_commitment: &[u8; HOST_COMMITMENT_LEN],
    ) -> Result<[u8; SIGNER_COMMITMENT_LEN], Error> {
        let mut sk = self.derive_private_key(path)?;
        let nonce = anti_exfil_nonce(&sk, signature_hash, host_commitment);
        sk.non_secure_erase();

        let mut nonce = nonce?;
        let commitment = PublicKey::from_secret_key(&self.secp, &nonce).serialize();
        nonce.non_secure_erase();

        Ok(commitment)
    }

    fn derive_blinding_factor(
        &self,
        kind: BlindingFactorKind,
        hash_prevouts: &[u8; 32],
        output_index: u32,
    ) -> Result<BlindingFactor, Error> {
        let mut tx_key = hmac_sha256(&self.master_blinding_key, &[&hash_prevouts[..]])?;

        let label = match kind {
            BlindingFactorKind::Asset => ABF_LABEL,
            BlindingFactorKind::Value => VBF_LABEL,
        };
        let mut index = [0u8; 4];
        BigEndian::write_u32(&mut index, output_index);

        let bf = hmac_sha256(&tx_key, &[label, &index[..]]);
        tx_key.zeroize();

        Ok(Zeroizing::new(bf?))
    }

    fn hmac_with_master_key(&self, data: &[u8]) -> Result<[u8; HMAC_LEN], Error> {
        hmac_sha256(&self.hmac_key, &[data])
    }

    fn sign(
        &self,
        path: &[u32],
        signature_hash: &[u8; SIGNATURE_HASH_LEN],
    ) -> Result<Vec<u8>, Error> {
        let mut sk = self.derive_private_key(path)?;

        let msg = Message::from_digest(*signature_hash);
        let sig = self.secp.sign_ecdsa(&msg, &sk);
        sk.non_secure_erase();

        let mut out = sig.serialize_der().to_vec();
        out.push(SIGHASH_ALL);
        Ok(out)
    }

    fn sign_anti_exfil(
        &self,
        path: &[u32],
        signature_hash: &[u8; SIGNATURE_HASH_LEN],
        host_commitment: &[u8; HOST_COMMITMENT_LEN],
        host_entropy: &[u8; HOST_ENTROPY_LEN],
    ) -> Result<Vec<u8>, Error> {
        if anti_exfil::host_commitment(host_entropy) != *host_commitment {
            return Err(Error::HostEntropyMismatch);
        }

        let mut sk = self.derive_private_key(path)?;
        let sig = self.sign_committed(&sk, signature_hash, host_commitment, host_entropy);
        sk.non_secure_erase();

        let mut out = sig?.serialize_der().to_vec();
        out.push(SIGHASH_ALL);
        Ok(out)
    }

    fn derive_script(&self, path: &[u32]) -> Result<Vec<u8>, Error> {
        let pk = self.public_key(path)?;
        let h = hash160::Hash::hash(&pk.serialize());

        // p2wpkh: OP_0 PUSH20 <hash160(pubkey)>
        let mut script = Vec::with_capacity(22);
        script.extend_from_slice(&[0x00, 0x14]);
        script.extend_from_slice(h.as_byte_array());
        Ok(script)
    }
}

/// Deterministic anti-exfil nonce bound to the key, message and host commitment
fn anti_exfil_nonce(
    sk: &SecretKey,
    signature_hash: &[u8; SIGNATURE_HASH_LEN],
    host_commitment: &[u8; HOST_COMMITMENT_LEN],
) -> Result<SecretKey, Error> {
    let mut k = hmac_sha256(&sk.secret_bytes(), &[&signature_hash[..], &host_commitment[..]])?;
    let nonce = SecretKey::from_slice(&k[..]).map_err(|_| Error::Secp);
    k.zeroize();
    nonce
}

fn hmac_sha256(key: &[u8], parts: &[&[u8]]) -> Result<[u8; 32], Error> {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(key).map_err(|_| Error::Derivation)?;
    for p in parts {
        mac.update(p);
    }
    Ok(mac.finalize().into_bytes().into())
}

fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Result<[u8; 64], Error> {
    let mut mac = <Hmac<Sha512> as Mac>::new_from_slice(key).map_err(|_| Error::Derivation)?;
    for p in parts {
        mac.update(p);
    }
    Ok(mac.finalize().into_bytes().into())
}
