// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Channel backed [Host] for driving an engine in tests

use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::trace;

use liquid_signer_core::engine::{Host, Message, Reply};

/// Default time to wait for a host message before treating the host as gone
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(500);

/// Engine side of the host channel
pub struct ChannelHost {
    rx: Receiver<Message>,
    tx: Sender<Reply>,
    timeout: Duration,
}

/// Test side of the host channel
#[derive(Clone)]
pub struct HostHandle {
    tx: Sender<Message>,
    rx: Receiver<Reply>,
}

/// Create a connected host pair
pub fn channel(timeout: Duration) -> (ChannelHost, HostHandle) {
    let (msg_tx, msg_rx) = unbounded();
    let (reply_tx, reply_rx) = unbounded();

    (
        ChannelHost {
            rx: msg_rx,
            tx: reply_tx,
            timeout,
        },
        HostHandle {
            tx: msg_tx,
            rx: reply_rx,
        },
    )
}

/// Create a host with pre-queued messages, the host disconnects once
/// these have been consumed
pub fn load(messages: impl IntoIterator<Item = Message>) -> (ChannelHost, Receiver<Reply>) {
    let (host, handle) = channel(REQUEST_TIMEOUT);
    for m in messages {
        handle.send(m);
    }

    (host, handle.rx)
}

impl ChannelHost {
    /// Number of queued messages not yet consumed by the engine
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

impl Host for ChannelHost {
    fn next_message(&mut self) -> Option<Message> {
        self.rx.recv_timeout(self.timeout).ok()
    }

    fn reply(&mut self, reply: Reply) {
        trace!("reply: {:?}", reply);
        let _ = self.tx.send(reply);
    }
}

impl HostHandle {
    /// Queue a message for the engine
    pub fn send(&self, msg: Message) {
        trace!("send: {} {}", msg.id, msg.event);
        let _ = self.tx.send(msg);
    }

    /// Await the next reply
    pub fn recv(&self, timeout: Duration) -> Option<Reply> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Collect replies received so far
    pub fn replies(&self) -> Vec<Reply> {
        self.rx.try_iter().collect()
    }
}
