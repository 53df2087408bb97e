// Copyright (c) 2022-2023 The MobileCoin Foundation

use anyhow::{anyhow, ensure};
use log::{debug, info};

use liquid_signer_core::{
    engine::{Engine, Error, Host, Message, Output, Reply, Ui},
    keychain::{anti_exfil, Keychain, SoftKeychain, SIGNER_COMMITMENT_LEN},
    Network,
};

use crate::{
    fixtures::{id, AssetSpec, InputSpec, OutputSpec, TxBuilder, TxFixture, OTHER_ASSET},
    host,
};

pub struct TransactionExpectation<'a> {
    pub name: &'a str,
    pub network: Network,
    pub inputs: &'a [InputSpec],
    pub outputs: &'a [OutputSpec],
}

impl<'a> TransactionExpectation<'a> {
    pub fn builder(&self) -> TxBuilder {
        TxBuilder::new(self.network)
            .inputs(self.inputs)
            .outputs(self.outputs)
    }

    pub fn fixture(&self, k: &SoftKeychain) -> TxFixture {
        self.builder().build(k)
    }
}

pub const TRANSACTIONS: &[TransactionExpectation<'static>] = &[
    TransactionExpectation {
        name: "blinded payment with fee",
        network: Network::Liquid,
        inputs: &[InputSpec::wpkh(), InputSpec::wpkh()],
        outputs: &[
            OutputSpec::blinded(100_000),
            OutputSpec::balancing(49_500),
            OutputSpec::Fee { value: 500 },
        ],
    },
    TransactionExpectation {
        name: "legacy and foreign inputs",
        network: Network::Liquid,
        inputs: &[InputSpec::pkh(), InputSpec::foreign(), InputSpec::pkh()],
        outputs: &[
            OutputSpec::blinded(2_000),
            OutputSpec::Explicit {
                value: 7,
                asset: AssetSpec::Id(OTHER_ASSET),
                script: &[0x51],
            },
            OutputSpec::Fee { value: 250 },
        ],
    },
    TransactionExpectation {
        name: "issued asset with change",
        network: Network::TestnetLiquid,
        inputs: &[InputSpec::wpkh()],
        outputs: &[
            OutputSpec::Blinded {
                value: 1_000_000,
                asset: AssetSpec::Id(OTHER_ASSET),
                odd_vbf: false,
                change: false,
            },
            OutputSpec::change(31_337),
            OutputSpec::Fee { value: 100 },
        ],
    },
    TransactionExpectation {
        name: "unblinded only",
        network: Network::LocaltestLiquid,
        inputs: &[InputSpec::wpkh(), InputSpec::foreign()],
        outputs: &[
            OutputSpec::Explicit {
                value: 10_000,
                asset: AssetSpec::Policy,
                script: &[0x00, 0x14, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10, 0x11, 0x12, 0x13, 0x14],
            },
            OutputSpec::Fee { value: 1_000 },
        ],
    },
];

/// Session outcome
pub struct Session {
    pub result: Result<(), Error>,
    pub replies: Vec<Reply>,
    /// Host messages left unread by the engine
    pub unread: usize,
}

/// Run a single signing session over pre-queued messages, the first of
/// which must be the `sign_liquid_tx` request
pub fn run_session<K: Keychain, U: Ui>(
    engine: &mut Engine<K, U>,
    messages: Vec<Message>,
) -> Session {
    let (mut h, replies) = host::load(messages);

    let result = match h.next_message() {
        Some(m) => engine.handle(&mut h, m),
        None => panic!("no request message"),
    };

    Session {
        result,
        unread: h.pending(),
        replies: replies.try_iter().collect(),
    }
}

/// Sign a fixture transaction and verify every reply against the keychain
pub fn test<K: Keychain, U: Ui>(
    engine: &mut Engine<K, U>,
    k: &SoftKeychain,
    fixture: &TxFixture,
    use_ae_signatures: bool,
) -> anyhow::Result<()> {
    let n = fixture.inputs.len();

    info!(
        "Starting transaction ({} inputs, {} outputs, ae: {use_ae_signatures})",
        n,
        fixture.tx.output.len()
    );

    let session = run_session(engine, fixture.messages(use_ae_signatures));
    session.result?;

    ensure!(session.unread == 0, "{} unread messages", session.unread);

    let expected = match use_ae_signatures {
        true => 1 + 2 * n,
        false => 1 + n,
    };
    ensure!(
        session.replies.len() == expected,
        "expected {expected} replies, got {}",
        session.replies.len()
    );

    let mut replies = session.replies.into_iter();
    let ack = replies.next().ok_or_else(|| anyhow!("missing ack"))?;
    ensure!(ack == Reply::new(id("sign"), Output::Ok), "unexpected ack {ack:?}");

    let mut signer_commitments = vec![None; n];

    if use_ae_signatures {
        for (i, r) in replies.by_ref().take(n).enumerate() {
            ensure!(r.id == id(&format!("in{i}")), "unexpected reply id {}", r.id);

            let c = match r.output {
                Output::SignerCommitment(c) => c,
                o => return Err(anyhow!("expected signer commitment, got {o:?}")),
            };

            match fixture.is_signed(i) {
                true => {
                    let c: [u8; SIGNER_COMMITMENT_LEN] = c[..]
                        .try_into()
                        .map_err(|_| anyhow!("invalid signer commitment for input {i}"))?;
                    signer_commitments[i] = Some(c);
                }
                false => ensure!(c.is_empty(), "signer commitment for unsigned input {i}"),
            }
        }
    }

    for (i, r) in replies.enumerate() {
        let expected_id = match use_ae_signatures {
            true => format!("sig{i}"),
            false => format!("in{i}"),
        };
        ensure!(r.id == id(&expected_id), "unexpected reply id {}", r.id);

        let sig = match r.output {
            Output::Signature(s) => s,
            o => return Err(anyhow!("expected signature, got {o:?}")),
        };

        debug!("input {i} signature: {}", hex::encode(&sig));

        if !fixture.is_signed(i) {
            ensure!(sig.is_empty(), "signature for unsigned input {i}");
            continue;
        }

        ensure!(
            fixture.verify_signature(k, i, &sig),
            "invalid signature for input {i}"
        );

        // Signature nonce must open the signer commitment with our entropy
        if let Some(c) = &signer_commitments[i] {
            ensure!(
                anti_exfil::verify_commitment_opening(c, &fixture.entropy[i], &sig),
                "signature for input {i} does not open the signer commitment"
            );
        }
    }

    info!("Transaction signed");

    Ok(())
}
