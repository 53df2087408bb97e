// Copyright (c) 2022-2023 The MobileCoin Foundation

use elements::Transaction;

use super::{Error, OutputInfo, MAX_PATH_LEN};
use crate::keychain::Keychain;

/// Validate host-declared change outputs against keychain derived scripts,
/// flagging matching outputs as change.
pub fn validate_change_paths<K: Keychain>(
    keychain: &K,
    tx: &Transaction,
    change: &[Option<Vec<u32>>],
    info: &mut [OutputInfo],
) -> Result<(), Error> {
    if change.len() != tx.output.len() {
        return Err(Error::ChangeCountMismatch);
    }

    for (index, (path, txout)) in change.iter().zip(tx.output.iter()).enumerate() {
        let path = match path {
            Some(p) => p,
            None => continue,
        };

        if path.is_empty() || path.len() > MAX_PATH_LEN {
            return Err(Error::ChangeMismatch);
        }

        let script = keychain
            .derive_script(path)
            .map_err(|_| Error::ChangeMismatch)?;

        if script.as_slice() != txout.script_pubkey.as_bytes() {
            #[cfg(feature = "log")]
            log::warn!("change path mismatch for output {index}");

            return Err(Error::ChangeMismatch);
        }

        info[index].is_change = true;
    }

    Ok(())
}
