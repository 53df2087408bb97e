// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Per-input signing data and the two signature reply protocols

use heapless::Vec;

use super::{Error, Event, Host, MessageId, Output, Reply, TxInput, MAX_PATH_LEN};
use crate::keychain::{
    anti_exfil, Keychain, HOST_COMMITMENT_LEN, HOST_ENTROPY_LEN, SIGNATURE_HASH_LEN, SIGNER_COMMITMENT_LEN,
    VALUE_COMMITMENT_LEN,
};

/// Derivation path
pub type Path = Vec<u32, MAX_PATH_LEN>;

/// Signing record, one per transaction input (in input order)
#[derive(Clone, PartialEq, Debug)]
pub struct SigningData {
    /// Correlation id of the input message
    pub id: MessageId,
    /// Derivation path, empty for inputs not being signed
    pub path: Path,
    /// Signature hash, valid only for signed inputs
    pub signature_hash: [u8; SIGNATURE_HASH_LEN],
    /// Anti-exfil host commitment, checked against the revealed entropy
    pub host_commitment: Option<[u8; HOST_COMMITMENT_LEN]>,
    /// Anti-exfil signer commitment
    pub signer_commitment: Option<[u8; SIGNER_COMMITMENT_LEN]>,
}

impl SigningData {
    /// Create a record for an input that will not be signed
    pub fn unsigned(id: MessageId) -> Self {
        Self {
            id,
            path: Vec::new(),
            signature_hash: [0u8; SIGNATURE_HASH_LEN],
            host_commitment: None,
            signer_commitment: None,
        }
    }

    /// Whether this input is to be signed
    pub fn is_signed(&self) -> bool {
        !self.path.is_empty()
    }
}

/// Validated `tx_input` parameters
#[derive(Clone, PartialEq, Debug)]
pub struct InputParams {
    pub is_witness: bool,
    pub signing: Option<SigningParams>,
}

/// Parameters present only for inputs being signed
#[derive(Clone, PartialEq, Debug)]
pub struct SigningParams {
    pub path: Path,
    pub script: std::vec::Vec<u8>,
    pub host_commitment: Option<[u8; HOST_COMMITMENT_LEN]>,
    pub value_commitment: Option<[u8; VALUE_COMMITMENT_LEN]>,
}

impl InputParams {
    /// Validate a `tx_input` message
    pub fn parse(input: TxInput, use_ae_signatures: bool) -> Result<Self, Error> {
        let is_witness = input.is_witness.ok_or(Error::MissingIsWitness)?;

        let path = match input.path {
            Some(p) => p,
            None => {
                if input.script.is_some()
                    || input.ae_host_commitment.is_some()
                    || input.value_commitment.is_some()
                {
                    return Err(Error::UnexpectedSigningFields);
                }

                return Ok(Self {
                    is_witness,
                    signing: None,
                });
            }
        };

        if path.is_empty() {
            return Err(Error::InvalidPath);
        }
        let path = Path::from_slice(&path).map_err(|_| Error::InvalidPath)?;

        let host_commitment = match use_ae_signatures {
            true => Some(
                fixed::<HOST_COMMITMENT_LEN>(input.ae_host_commitment.as_deref())
                    .ok_or(Error::InvalidHostCommitment)?,
            ),
            false => None,
        };

        let script = match input.script {
            Some(s) if !s.is_empty() => s,
            _ => return Err(Error::MissingScript),
        };

        let value_commitment = match is_witness {
            true => Some(
                fixed::<VALUE_COMMITMENT_LEN>(input.value_commitment.as_deref())
                    .ok_or(Error::InvalidValueCommitment)?,
            ),
            false => None,
        };

        Ok(Self {
            is_witness,
            signing: Some(SigningParams {
                path,
                script,
                host_commitment,
                value_commitment,
            }),
        })
    }
}

fn fixed<const N: usize>(v: Option<&[u8]>) -> Option<[u8; N]> {
    v.and_then(|b| b.try_into().ok())
}

/// Sign and reply for every input, addressed to the stored input correlation ids
pub fn send_ec_signature_replies<K: Keychain, H: Host>(
    keychain: &K,
    host: &mut H,
    signing_data: &[SigningData],
    reply_to: &mut MessageId,
) -> Result<(), Error> {
    for data in signing_data {
        *reply_to = data.id.clone();

        let sig = match data.is_signed() {
            true => keychain
                .sign(&data.path, &data.signature_hash)
                .map_err(|_| Error::SignFailed)?,
            false => std::vec::Vec::new(),
        };

        host.reply(Reply::new(data.id.clone(), Output::Signature(sig)));
    }

    Ok(())
}

/// Receive one `get_signature` per input, replying with the anti-exfil signature
pub fn send_ae_signature_replies<K: Keychain, H: Host>(
    keychain: &K,
    host: &mut H,
    signing_data: &[SigningData],
    reply_to: &mut MessageId,
) -> Result<(), Error> {
    for data in signing_data {
        let msg = host.next_message().ok_or(Error::ExpectedGetSignature)?;
        *reply_to = msg.id.clone();

        let req = match msg.event {
            Event::GetSignature(r) => r,
            _ev => {
                #[cfg(feature = "log")]
                log::error!("unexpected {_ev} message, expecting get_signature");

                return Err(Error::ExpectedGetSignature);
            }
        };

        let sig = match data.is_signed() {
            true => {
                let entropy = fixed::<HOST_ENTROPY_LEN>(req.ae_host_entropy.as_deref())
                    .ok_or(Error::InvalidHostEntropy)?;
                let host_commitment = data.host_commitment.ok_or(Error::SignFailed)?;

                if anti_exfil::host_commitment(&entropy) != host_commitment {
                    return Err(Error::HostEntropyMismatch);
                }

                keychain
                    .sign_anti_exfil(&data.path, &data.signature_hash, &host_commitment, &entropy)
                    .map_err(|_| Error::SignFailed)?
            }
            false => std::vec::Vec::new(),
        };

        host.reply(Reply::new(msg.id, Output::Signature(sig)));
    }

    Ok(())
}
