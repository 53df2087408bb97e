#![allow(unused)]

use std::time::Duration;

use liquid_signer_core::{
    engine::{Config, ConfirmMode, Engine, ErrorCode, Output, Reply},
    gate::EventBus,
    keychain::SoftKeychain,
};
use liquid_signer_tests::{
    fixtures::{id, keychain},
    ui::{Decision, ScriptedUi},
};

pub use liquid_signer_tests::fixtures::MNEMONIC;

pub type TestEngine<'a> = Engine<&'a SoftKeychain, ScriptedUi>;

pub fn setup() -> SoftKeychain {
    let _ = simplelog::SimpleLogger::init(log::LevelFilter::Debug, Default::default());

    keychain(MNEMONIC)
}

/// Interactive engine with scripted output / fee decisions
pub fn engine(k: &SoftKeychain, outputs: Decision, fee: Decision) -> TestEngine<'_> {
    let events = EventBus::new();
    Engine::new(k, ScriptedUi::new(events.clone(), outputs, fee), events)
}

/// Unattended engine, the UI never fires
pub fn auto_engine(k: &SoftKeychain, delay: Duration) -> TestEngine<'_> {
    let events = EventBus::new();
    Engine::with_config(
        k,
        ScriptedUi::new(events.clone(), Decision::Wait, Decision::Wait),
        events,
        Config {
            confirm: ConfirmMode::AutoAccept { delay },
        },
    )
}

/// Assert a reply is a rejection with the provided id and code
pub fn assert_rejected(r: &Reply, reply_id: &str, code: ErrorCode) {
    assert_eq!(r.id, id(reply_id), "unexpected reply id for {r:?}");
    match &r.output {
        Output::Reject { code: c, .. } => assert_eq!(*c, code),
        o => panic!("expected rejection, got {o:?}"),
    }
}

/// Count signature replies
pub fn signatures(replies: &[Reply]) -> usize {
    replies
        .iter()
        .filter(|r| matches!(r.output, Output::Signature(_)))
        .count()
}
