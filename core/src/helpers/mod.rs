// Copyright (c) 2022-2023 The MobileCoin Foundation

use core::str::from_utf8;

use emstr::{helpers::Fractional, EncodeStr};

use crate::network::Network;

/// Satoshi per policy asset unit
const SCALAR_BTC: i128 = 100_000_000;
const BTC_MAX_SF: usize = 14;

/// Number of asset id bytes shown for non-policy assets
const ASSET_ID_PREFIX: usize = 4;

// Format helper for values and assets, policy asset values are shown
// with their ticker, other assets by raw value and (truncated) asset id
pub fn fmt_asset_value<'a>(
    value: u64,
    asset_id: &[u8; 32],
    network: Network,
    buff: &'a mut [u8],
) -> &'a str {
    let ticker = match network.policy_asset_bytes() {
        Some(p) if &p == asset_id => network.policy_asset_ticker(),
        _ => None,
    };
    let scalar = match ticker {
        Some(_) => SCALAR_BTC,
        None => 1,
    };
    // Widened so the full u64 range stays exact
    let value = i128::from(value);

    let mut n = match emstr::write!(&mut buff[..], Fractional::<i128>::new(value, scalar)) {
        Ok(v) => v,
        Err(_) => return "ENCODE_ERR",
    };

    // Truncate values exceeding max chars
    if ticker.is_some() && n > BTC_MAX_SF {
        n = BTC_MAX_SF;
        buff[n] = b'.';
        buff[n + 1] = b'.';
        n += 2;
    }

    // Asset ids are displayed in reversed byte order
    let mut id = [0u8; ASSET_ID_PREFIX];
    for (d, s) in id.iter_mut().zip(asset_id.iter().rev()) {
        *d = *s;
    }
    let mut id_hex = [0u8; ASSET_ID_PREFIX * 2];
    if hex::encode_to_slice(id, &mut id_hex).is_err() {
        return "ENCODE_ERR";
    }
    let id_hex = match from_utf8(&id_hex) {
        Ok(v) => v,
        Err(_) => return "INVALID_UTF8",
    };

    let r = match ticker {
        Some(t) => emstr::write!(&mut buff[n..], ' ', t),
        None => emstr::write!(&mut buff[n..], " (", id_hex, "..)"),
    };
    match r {
        Ok(v) => n += v,
        Err(_) => return "ENCODE_ERR",
    }

    match from_utf8(&buff[..n]) {
        Ok(v) => v,
        Err(_) => "INVALID_UTF8",
    }
}
