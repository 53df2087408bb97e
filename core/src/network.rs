// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Network identifiers and per-network constants
//!
//! Networks are identified by their canonical names (`mainnet`, `liquid`,
//! `testnet`, `testnet-liquid`, `localtest`, `localtest-liquid`), unknown names
//! fail to parse. Liquid-only properties return `None` for bitcoin networks.

use strum::{Display, EnumIter, EnumString, EnumVariantNames, IntoStaticStr};

/// Supported networks
#[derive(
    Copy, Clone, PartialEq, Eq, Debug, EnumString, Display, EnumVariantNames, EnumIter, IntoStaticStr,
)]
pub enum Network {
    #[strum(serialize = "mainnet")]
    Mainnet,
    #[strum(serialize = "liquid")]
    Liquid,
    #[strum(serialize = "testnet")]
    Testnet,
    #[strum(serialize = "testnet-liquid")]
    TestnetLiquid,
    #[strum(serialize = "localtest")]
    Localtest,
    #[strum(serialize = "localtest-liquid")]
    LocaltestLiquid,
}

/// Network type, a signer may be restricted to one type for the lifetime of a session
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display)]
pub enum NetworkType {
    /// Main (production) networks
    Main,
    /// Test / regtest networks
    Test,
}

/// Policy asset (L-BTC) for the liquid mainnet, display (reversed) hex
const LIQUID_POLICY_ASSET: &str =
    "6f0279e9ed041c3d710a9f57d0c02928416460c4b722ae3457a11eec381c526d";

/// Policy asset for the liquid testnet
const TESTNET_LIQUID_POLICY_ASSET: &str =
    "144c654344aa716d6f3abcc1ca90e5641e4e2a7f633bc09fe3baf64585819a49";

/// Policy asset for local (elements regtest) networks
const LOCALTEST_LIQUID_POLICY_ASSET: &str =
    "5ac9f65c0efcc4775e0baec4ec03abdde22473cd3cf33c0419ca290e0751b225";

/// BIP32 extended private key (xprv) version bytes for main networks
const BIP32_VERSION_MAIN: u32 = 0x0488_ADE4;
/// BIP32 extended private key (tprv) version bytes for test networks
const BIP32_VERSION_TEST: u32 = 0x0435_8394;

impl Network {
    /// Whether this is a test network
    pub const fn is_test(&self) -> bool {
        matches!(
            self,
            Network::Testnet | Network::TestnetLiquid | Network::Localtest | Network::LocaltestLiquid
        )
    }

    /// Whether this is a liquid (elements) network
    pub const fn is_liquid(&self) -> bool {
        matches!(
            self,
            Network::Liquid | Network::TestnetLiquid | Network::LocaltestLiquid
        )
    }

    /// Network type for this network
    pub const fn network_type(&self) -> NetworkType {
        match self.is_test() {
            true => NetworkType::Test,
            false => NetworkType::Main,
        }
    }

    /// Whether the provided network type is consistent with this network
    pub fn is_type_consistent(&self, network_type: Option<NetworkType>) -> bool {
        match network_type {
            Some(t) => t == self.network_type(),
            None => true,
        }
    }

    /// Expected CSV (relative timelock) values for recovery scripts
    pub const fn csv_values(&self) -> &'static [u16] {
        match self {
            Network::Mainnet => &[25920, 51840, 65535],
            Network::Liquid => &[65535],
            Network::Testnet | Network::Localtest => &[144, 4320, 51840],
            Network::TestnetLiquid | Network::LocaltestLiquid => &[1440, 65535],
        }
    }

    /// Minimum allowed CSV value
    pub const fn min_allowed_csv_blocks(&self) -> u16 {
        match self {
            Network::Mainnet => 25920,
            Network::Liquid => 65535,
            Network::Testnet | Network::Localtest => 144,
            Network::TestnetLiquid | Network::LocaltestLiquid => 1440,
        }
    }

    /// Numeric network identifier
    pub const fn network_id(&self) -> u8 {
        match self {
            Network::Mainnet => 0x01,
            Network::Testnet | Network::Localtest => 0x02,
            Network::Liquid => 0x03,
            Network::LocaltestLiquid => 0x04,
            Network::TestnetLiquid => 0x05,
        }
    }

    /// BIP32 extended private key version (xprv / tprv)
    pub const fn bip32_version(&self) -> u32 {
        match self.is_test() {
            false => BIP32_VERSION_MAIN,
            true => BIP32_VERSION_TEST,
        }
    }

    /// Base58 p2pkh address prefix
    pub const fn p2pkh_prefix(&self) -> u8 {
        match self {
            Network::Mainnet => 0x00,
            Network::Testnet | Network::Localtest => 0x6F,
            Network::Liquid => 0x39,
            Network::TestnetLiquid => 0x24,
            Network::LocaltestLiquid => 0xEB,
        }
    }

    /// Base58 p2sh address prefix
    pub const fn p2sh_prefix(&self) -> u8 {
        match self {
            Network::Mainnet => 0x05,
            Network::Testnet | Network::Localtest => 0xC4,
            Network::Liquid => 0x27,
            Network::TestnetLiquid => 0x13,
            Network::LocaltestLiquid => 0x4B,
        }
    }

    /// Segwit (bech32) human readable part
    pub const fn bech32_hrp(&self) -> &'static str {
        match self {
            Network::Mainnet => "bc",
            Network::Testnet => "tb",
            Network::Localtest => "bcrt",
            Network::Liquid => "ex",
            Network::TestnetLiquid => "tex",
            Network::LocaltestLiquid => "ert",
        }
    }

    /// Confidential address prefix, liquid only
    pub const fn confidential_prefix(&self) -> Option<u8> {
        match self {
            Network::Liquid => Some(0x0C),
            Network::TestnetLiquid => Some(0x17),
            Network::LocaltestLiquid => Some(0x04),
            _ => None,
        }
    }

    /// Confidential segwit (blech32) human readable part, liquid only
    pub const fn blech32_hrp(&self) -> Option<&'static str> {
        match self {
            Network::Liquid => Some("lq"),
            Network::TestnetLiquid => Some("tlq"),
            Network::LocaltestLiquid => Some("el"),
            _ => None,
        }
    }

    /// Whether this network uses the testnet asset registry
    pub const fn uses_testnet_assets(&self) -> bool {
        matches!(self, Network::TestnetLiquid)
    }

    /// Policy asset id in display (reversed hex) form, liquid only
    pub const fn policy_asset(&self) -> Option<&'static str> {
        match self {
            Network::Liquid => Some(LIQUID_POLICY_ASSET),
            Network::TestnetLiquid => Some(TESTNET_LIQUID_POLICY_ASSET),
            Network::LocaltestLiquid => Some(LOCALTEST_LIQUID_POLICY_ASSET),
            _ => None,
        }
    }

    /// Policy asset id in wire (little-endian) byte order, liquid only
    pub fn policy_asset_bytes(&self) -> Option<[u8; 32]> {
        let mut b = [0u8; 32];
        hex::decode_to_slice(self.policy_asset()?, &mut b).ok()?;
        b.reverse();
        Some(b)
    }

    /// Display ticker for the policy asset, liquid only
    pub const fn policy_asset_ticker(&self) -> Option<&'static str> {
        match (self.is_liquid(), self.uses_testnet_assets()) {
            (true, false) => Some("L-BTC"),
            (true, true) => Some("tL-BTC"),
            _ => None,
        }
    }
}
