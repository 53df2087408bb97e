// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Scripted [Ui], recording displays and firing user decisions on the
//! engine's event bus

use std::sync::Arc;

use crossbeam_channel::Sender;
use elements::Transaction;
use log::debug;
use parking_lot::Mutex;

use liquid_signer_core::{
    engine::{
        OutputInfo, Ui, BTN_ACCEPT_SIGNATURE, BTN_REJECT_SIGNATURE, SIGN_TX_ACCEPT_OUTPUTS,
        SIGN_TX_DECLINE_OUTPUTS,
    },
    gate::{EventBus, EventClass, EventId},
    helpers::fmt_asset_value,
    Network,
};

/// User decision at a confirmation checkpoint
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Decision {
    Accept,
    Decline,
    /// Leave the decision to the test (or to auto-accept)
    Wait,
}

/// Recorded display
#[derive(Clone, PartialEq, Debug)]
pub enum Display {
    Outputs {
        network: Network,
        lines: Vec<String>,
        change: Vec<bool>,
    },
    Processing,
    Fee {
        network: Network,
        fee: u64,
        text: String,
        warning: Option<String>,
    },
}

#[derive(Clone)]
pub struct ScriptedUi {
    events: EventBus,
    outputs: Decision,
    fee: Decision,
    displays: Arc<Mutex<Vec<Display>>>,
    notify: Option<Sender<Display>>,
}

impl ScriptedUi {
    pub fn new(events: EventBus, outputs: Decision, fee: Decision) -> Self {
        Self {
            events,
            outputs,
            fee,
            displays: Arc::new(Mutex::new(vec![])),
            notify: None,
        }
    }

    pub fn accept_all(events: EventBus) -> Self {
        Self::new(events, Decision::Accept, Decision::Accept)
    }

    /// Forward displays to a channel (after any scripted decision has fired)
    pub fn with_notify(mut self, notify: Sender<Display>) -> Self {
        self.notify = Some(notify);
        self
    }

    /// Displays shown so far
    pub fn displays(&self) -> Vec<Display> {
        self.displays.lock().clone()
    }

    /// Final (fee) confirmation, if shown
    pub fn fee_display(&self) -> Option<Display> {
        self.displays
            .lock()
            .iter()
            .find(|d| matches!(d, Display::Fee { .. }))
            .cloned()
    }

    fn show(&self, d: Display, class: EventClass, decision: Decision, ids: (EventId, EventId)) {
        debug!("display: {:?}", d);

        self.displays.lock().push(d.clone());

        match decision {
            Decision::Accept => self.events.fire(class, ids.0, &[]),
            Decision::Decline => self.events.fire(class, ids.1, &[]),
            Decision::Wait => (),
        }

        if let Some(n) = &self.notify {
            let _ = n.send(d);
        }
    }
}

impl Ui for ScriptedUi {
    fn display_outputs(&mut self, network: Network, tx: &Transaction, outputs: &[OutputInfo]) {
        assert_eq!(tx.output.len(), outputs.len());

        let mut buff = [0u8; 64];
        let lines = outputs
            .iter()
            .map(|o| fmt_asset_value(o.value, &o.asset_id, network, &mut buff).to_string())
            .collect();
        let change = outputs.iter().map(|o| o.is_change).collect();

        self.show(
            Display::Outputs {
                network,
                lines,
                change,
            },
            EventClass::Process,
            self.outputs,
            (SIGN_TX_ACCEPT_OUTPUTS, SIGN_TX_DECLINE_OUTPUTS),
        );
    }

    fn display_final_confirmation(&mut self, network: Network, fee: u64, warning: Option<&str>) {
        let mut buff = [0u8; 64];
        let text = match network.policy_asset_bytes() {
            Some(a) => fmt_asset_value(fee, &a, network, &mut buff).to_string(),
            None => fee.to_string(),
        };

        self.show(
            Display::Fee {
                network,
                fee,
                text,
                warning: warning.map(|w| w.to_string()),
            },
            EventClass::Button,
            self.fee,
            (BTN_ACCEPT_SIGNATURE, BTN_REJECT_SIGNATURE),
        );
    }

    fn display_processing(&mut self) {
        self.displays.lock().push(Display::Processing);
    }
}
