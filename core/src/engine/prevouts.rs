// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Prevouts accumulator, `sha256d(txid_0 || vout_0 || .. || txid_n || vout_n)`

use byteorder::{ByteOrder, LittleEndian};
use elements::{hashes::Hash, OutPoint};
use sha2::{Digest, Sha256};

/// Running hash over every input's previous output
#[derive(Clone, Default)]
pub struct PrevoutHasher {
    sha: Sha256,
}

impl PrevoutHasher {
    /// Create a new accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a previous output (txid in wire byte order)
    pub fn update(&mut self, txid: &[u8; 32], vout: u32) {
        let mut index = [0u8; 4];
        LittleEndian::write_u32(&mut index, vout);

        self.sha.update(txid);
        self.sha.update(index);
    }

    /// Add an input's previous output
    pub fn update_outpoint(&mut self, outpoint: &OutPoint) {
        self.update(&outpoint.txid.to_byte_array(), outpoint.vout)
    }

    /// Finalise with the second sha256 round
    pub fn finalize(self) -> [u8; 32] {
        let first = self.sha.finalize();
        Sha256::digest(first).into()
    }
}
