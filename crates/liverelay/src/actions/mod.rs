//! Host actions reachable through the relay.
//!
//! Each submodule registers a group of handlers against the [`Song`] model.
//! Handlers validate their own indices and report precondition failures as
//! [`ActionError::Rejected`]; only the host API itself can fault.
//!
//! [`Song`]: crate::song::Song
//! [`ActionError::Rejected`]: crate::dispatch::ActionError::Rejected

mod clips;
mod common;
mod devices;
mod notes;
mod scenes;
mod tracks;
mod transport;

use crate::dispatch::DispatchTable;
use crate::host::Host;

/// Builds the dispatch table holding every host action.
#[must_use]
pub fn catalog<H: Host + 'static>() -> DispatchTable<H> {
    let mut table = DispatchTable::new();
    transport::register(&mut table);
    tracks::register(&mut table);
    clips::register(&mut table);
    notes::register(&mut table);
    scenes::register(&mut table);
    devices::register(&mut table);
    table
}
