// Copyright (c) 2022-2023 The MobileCoin Foundation

use core::time::Duration;

/// [Engine][super::Engine] configuration
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Config {
    /// Confirmation checkpoint behaviour
    pub confirm: ConfirmMode,
}

/// Confirmation checkpoint behaviour
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub enum ConfirmMode {
    /// Block on the user interface with no timeout
    #[default]
    Interactive,

    /// Unattended (test / CI) mode, wait for `delay` then accept
    AutoAccept { delay: Duration },
}
