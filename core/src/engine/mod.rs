// Copyright (c) 2022-2023 The MobileCoin Foundation

//! The [Engine] signs confidential (liquid) transactions for a host.
//!
//! Host [Message]s are handled via [Engine::handle], with [Reply]s returned
//! through the [Host] collaborator and confirmations presented via the [Ui]
//! collaborator, user decisions are received through the [EventBus].

use core::str::FromStr;
use std::time::Duration;

use elements::{encode, Transaction};
use strum::{Display, EnumVariantNames};

use crate::{
    gate::{EventBus, EventClass, EventId, ANY_ID},
    keychain::Keychain,
    network::{Network, NetworkType},
};

mod change;

pub mod commitments;
pub use commitments::OutputInfo;

mod config;
pub use config::{Config, ConfirmMode};

mod error;
pub use error::{Error, ErrorCode};

mod event;
pub use event::{
    Event, GetSignature, Message, MessageId, SignLiquidTx, TrustedCommitment, TxInput, MAX_ID_LEN,
};

mod flavour;
pub use flavour::ScriptFlavour;

mod output;
pub use output::{Output, Reply};

pub mod prevouts;
use prevouts::PrevoutHasher;

mod signing;
pub use signing::{InputParams, Path, SigningData, SigningParams};

/// Maximum derivation path length
pub const MAX_PATH_LEN: usize = 16;

/// Fee confirmation warning for inputs of differing script flavours
pub const WARN_MIXED_INPUTS: &str = "Your inputs have a mix of script types";

/// Output confirmation accepted
pub const SIGN_TX_ACCEPT_OUTPUTS: EventId = 0x100;
/// Output confirmation declined
pub const SIGN_TX_DECLINE_OUTPUTS: EventId = 0x101;
/// Fee confirmation accepted
pub const BTN_ACCEPT_SIGNATURE: EventId = 0x200;
/// Fee confirmation declined
pub const BTN_REJECT_SIGNATURE: EventId = 0x201;

/// Engine state enumeration
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display, EnumVariantNames)]
pub enum State {
    /// No session running
    Idle,
    /// Parsing request
    Parse,
    /// Deriving per-output display information
    DeriveOutputInfo,
    /// Outputs pending user approval
    AwaitOutputsConfirm,
    /// Receiving input N
    StreamInputs(usize),
    /// Closing the prevouts accumulator
    FinalizePrevouts,
    /// Verifying trusted commitments
    VerifyCommitments,
    /// Fee pending user approval
    AwaitFeeConfirm,
    /// Returning signatures
    SignAndReply,
    /// Session complete
    Complete,
    /// Session rejected
    Rejected(ErrorCode),
}

/// [`Host`] trait provides the message channel to the host
pub trait Host {
    /// Block for the next host message, `None` if the host has gone away
    fn next_message(&mut self) -> Option<Message>;

    /// Send a reply to the host
    fn reply(&mut self, reply: Reply);
}

impl<T: Host> Host for &mut T {
    fn next_message(&mut self) -> Option<Message> {
        T::next_message(self)
    }

    fn reply(&mut self, reply: Reply) {
        T::reply(self, reply)
    }
}

/// [`Ui`] trait provides confirmation displays, user decisions are fired
/// on the engine's [EventBus]
pub trait Ui {
    /// Display outputs for confirmation, firing [SIGN_TX_ACCEPT_OUTPUTS] on
    /// acceptance (any other [EventClass::Process] event declines)
    fn display_outputs(&mut self, network: Network, tx: &Transaction, outputs: &[OutputInfo]);

    /// Display fee for final confirmation, firing [BTN_ACCEPT_SIGNATURE] on
    /// acceptance (any other [EventClass::Button] event declines)
    fn display_final_confirmation(&mut self, network: Network, fee: u64, warning: Option<&str>);

    /// Display processing activity while inputs are streamed
    fn display_processing(&mut self) {}
}

impl<T: Ui> Ui for &mut T {
    fn display_outputs(&mut self, network: Network, tx: &Transaction, outputs: &[OutputInfo]) {
        T::display_outputs(self, network, tx, outputs)
    }

    fn display_final_confirmation(&mut self, network: Network, fee: u64, warning: Option<&str>) {
        T::display_final_confirmation(self, network, fee, warning)
    }

    fn display_processing(&mut self) {
        T::display_processing(self)
    }
}

/// [Engine] provides hardware-independent support for liquid transaction signing
pub struct Engine<K: Keychain, U: Ui> {
    state: State,
    network_type: Option<NetworkType>,
    config: Config,
    events: EventBus,
    keychain: K,
    ui: U,
}

impl<K: Keychain, U: Ui> Engine<K, U> {
    /// Create a new engine with the default (interactive) configuration
    pub fn new(keychain: K, ui: U, events: EventBus) -> Self {
        Self::with_config(keychain, ui, events, Config::default())
    }

    /// Create a new engine with the provided configuration
    pub fn with_config(keychain: K, ui: U, events: EventBus, config: Config) -> Self {
        Self {
            state: State::Idle,
            network_type: None,
            config,
            events,
            keychain,
            ui,
        }
    }

    /// Fetch engine state
    pub fn state(&self) -> State {
        self.state
    }

    /// Fetch network type restriction, set by the first valid request
    pub fn network_type(&self) -> Option<NetworkType> {
        self.network_type
    }

    /// Clear network type restriction
    pub fn clear_network_type(&mut self) {
        self.network_type = None;
    }

    /// Event bus used for confirmation checkpoints
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Access the UI collaborator
    pub fn ui(&self) -> &U {
        &self.ui
    }

    /// Handle host messages until the host goes away
    pub fn run<H: Host>(&mut self, host: &mut H) {
        while let Some(msg) = host.next_message() {
            let _ = self.handle(host, msg);
        }
    }

    /// Handle a single host message, running a signing session to completion
    /// for `sign_liquid_tx`. Rejections are sent to the host prior to returning.
    pub fn handle<H: Host>(&mut self, host: &mut H, msg: Message) -> Result<(), Error> {
        #[cfg(feature = "log")]
        log::debug!("message {}: {}", msg.id, msg.event);

        match msg.event {
            Event::SignLiquidTx(req) => self.sign_liquid_tx(host, msg.id, req),
            _ => {
                #[cfg(feature = "log")]
                log::error!("unexpected message {} outside of signing session", msg.id);

                let e = Error::UnexpectedEvent;
                host.reply(Reply::reject(msg.id, &e));
                Err(e)
            }
        }
    }

    /// Run a signing session
    pub fn sign_liquid_tx<H: Host>(
        &mut self,
        host: &mut H,
        id: MessageId,
        req: SignLiquidTx,
    ) -> Result<(), Error> {
        #[cfg(feature = "log")]
        log::info!(
            "sign_liquid_tx {id}: network {}, {} inputs, ae: {}",
            req.network,
            req.num_inputs,
            req.use_ae_signatures
        );

        // Rejections are addressed to the most recent host message
        let mut reply_to = id;

        match self.sign_liquid_tx_session(host, &mut reply_to, req) {
            Ok(()) => {
                #[cfg(feature = "log")]
                log::info!("sign_liquid_tx complete");

                self.state = State::Complete;
                Ok(())
            }
            Err(e) => {
                #[cfg(feature = "log")]
                match e.code() {
                    ErrorCode::UserCancelled => log::warn!("sign_liquid_tx: {e}"),
                    ErrorCode::InternalError => log::error!("sign_liquid_tx: {e}"),
                    _ => log::info!("sign_liquid_tx rejected: {e}"),
                }

                self.state = State::Rejected(e.code());
                host.reply(Reply::reject(reply_to, &e));
                Err(e)
            }
        }
    }

    fn sign_liquid_tx_session<H: Host>(
        &mut self,
        host: &mut H,
        reply_to: &mut MessageId,
        req: SignLiquidTx,
    ) -> Result<(), Error> {
        self.state = State::Parse;

        let network = Network::from_str(&req.network).map_err(|_| Error::InvalidNetwork)?;
        if !network.is_type_consistent(self.network_type) {
            return Err(Error::NetworkMismatch);
        }
        self.network_type = Some(network.network_type());

        if !network.is_liquid() {
            return Err(Error::NotLiquidNetwork);
        }

        if req.txn.is_empty() {
            return Err(Error::MissingTransaction);
        }
        let mut tx: Transaction =
            encode::deserialize(&req.txn).map_err(|_| Error::InvalidTransaction)?;

        if req.num_inputs == 0 {
            return Err(Error::InvalidInputCount);
        }
        if req.num_inputs != tx.input.len() {
            return Err(Error::InputCountMismatch);
        }

        if req.trusted_commitments.is_empty() {
            return Err(Error::MissingCommitments);
        }
        if req.trusted_commitments.len() != tx.output.len() {
            return Err(Error::CommitmentCountMismatch);
        }

        let commitments = req.trusted_commitments;
        let use_ae = req.use_ae_signatures;

        // Per-output display info, overwriting blinded outputs with trusted commitments
        self.state = State::DeriveOutputInfo;

        let mut output_info = vec![OutputInfo::default(); tx.output.len()];
        if let Some(change) = &req.change {
            change::validate_change_paths(&self.keychain, &tx, change, &mut output_info)?;
        }
        let fee = commitments::derive_output_info(&mut tx, &commitments, &mut output_info)?;

        self.state = State::AwaitOutputsConfirm;

        if !self.confirm(EventClass::Process, SIGN_TX_ACCEPT_OUTPUTS, |ui| {
            ui.display_outputs(network, &tx, &output_info)
        }) {
            #[cfg(feature = "log")]
            log::warn!("user declined to sign transaction outputs");

            return Err(Error::UserDeclined);
        }

        self.ui.display_processing();
        host.reply(Reply::new(reply_to.clone(), Output::Ok));

        // Stream inputs, every input contributes to the prevouts hash
        let mut signing_data = Vec::with_capacity(tx.input.len());
        let mut prevouts = PrevoutHasher::new();
        let mut flavour = ScriptFlavour::None;

        for index in 0..tx.input.len() {
            self.state = State::StreamInputs(index);

            let msg = host.next_message().ok_or(Error::ExpectedTxInput)?;
            *reply_to = msg.id.clone();

            let input = match msg.event {
                Event::TxInput(i) => i,
                _ev => {
                    #[cfg(feature = "log")]
                    log::error!("unexpected {_ev} message, expecting tx_input");

                    return Err(Error::ExpectedTxInput);
                }
            };

            let params = InputParams::parse(input, use_ae)?;

            prevouts.update_outpoint(&tx.input[index].previous_output);

            let data = self.process_input(&tx, index, msg.id, params, &mut flavour)?;

            if use_ae {
                let commitment = data
                    .signer_commitment
                    .as_ref()
                    .and_then(|c| heapless::Vec::from_slice(c).ok())
                    .unwrap_or_default();

                host.reply(Reply::new(
                    data.id.clone(),
                    Output::SignerCommitment(commitment),
                ));
            }

            signing_data.push(data);
        }

        assert_eq!(signing_data.len(), tx.input.len());

        self.state = State::FinalizePrevouts;
        let hash_prevouts = prevouts.finalize();

        self.state = State::VerifyCommitments;
        commitments::verify_trusted_commitments(&self.keychain, &hash_prevouts, &tx, &commitments)?;

        self.state = State::AwaitFeeConfirm;

        #[cfg(feature = "log")]
        {
            log_fee(network, fee);
            log::debug!("input script flavour: {flavour}");
        }

        let warning = (flavour == ScriptFlavour::Mixed).then_some(WARN_MIXED_INPUTS);
        if !self.confirm(EventClass::Button, BTN_ACCEPT_SIGNATURE, |ui| {
            ui.display_final_confirmation(network, fee, warning)
        }) {
            #[cfg(feature = "log")]
            log::warn!("user declined to sign transaction");

            // The host is awaiting a reply to its next (get_signature) message
            if use_ae {
                if let Some(msg) = host.next_message() {
                    *reply_to = msg.id;
                }
            }

            return Err(Error::UserDeclined);
        }

        self.state = State::SignAndReply;

        match use_ae {
            true => signing::send_ae_signature_replies(
                &self.keychain,
                host,
                &signing_data,
                reply_to,
            ),
            false => signing::send_ec_signature_replies(
                &self.keychain,
                host,
                &signing_data,
                reply_to,
            ),
        }
    }

    fn process_input(
        &self,
        tx: &Transaction,
        index: usize,
        id: MessageId,
        params: InputParams,
        flavour: &mut ScriptFlavour,
    ) -> Result<SigningData, Error> {
        let s = match params.signing {
            Some(s) => s,
            None => return Ok(SigningData::unsigned(id)),
        };

        *flavour = flavour.aggregate(ScriptFlavour::of_script(&s.script));

        let signature_hash = self
            .keychain
            .derive_signature_hash(
                tx,
                index,
                params.is_witness,
                &s.script,
                s.value_commitment.as_ref(),
            )
            .map_err(|_| Error::InputHashFailed)?;

        let signer_commitment = match &s.host_commitment {
            Some(c) => Some(
                self.keychain
                    .derive_signer_commitment(&s.path, &signature_hash, c)
                    .map_err(|_| Error::SignerCommitmentFailed)?,
            ),
            None => None,
        };

        #[cfg(feature = "log")]
        log::debug!("input {index} path: {:?}", s.path);

        Ok(SigningData {
            id,
            path: s.path,
            signature_hash,
            host_commitment: s.host_commitment,
            signer_commitment,
        })
    }

    /// Present a confirmation and block on the user decision
    fn confirm(&mut self, class: EventClass, accept: EventId, display: impl FnOnce(&mut U)) -> bool {
        // Registration precedes display so an immediate response is latched
        let registration = self.events.register(class, ANY_ID);

        display(&mut self.ui);

        match self.config.confirm {
            ConfirmMode::Interactive => match registration.wait(Duration::ZERO) {
                Some(f) => f.id == accept,
                None => false,
            },
            ConfirmMode::AutoAccept { delay } => {
                registration.unregister();
                std::thread::sleep(delay);
                true
            }
        }
    }
}

#[cfg(feature = "log")]
fn log_fee(network: Network, fee: u64) {
    if let Some(asset) = network.policy_asset_bytes() {
        let mut buff = [0u8; 32];
        let v = crate::helpers::fmt_asset_value(fee, &asset, network, &mut buff);
        log::info!("fee: {v}");
    }
}
