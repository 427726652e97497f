// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scoped connection guard.

use std::ops::{Deref, DerefMut};

use crate::adapter::Adapter;
use crate::device::Psu;
use crate::error::Result;
use crate::strategy::PsuStrategy;

/// Keeps a [`Psu`] connected for the lifetime of the guard.
///
/// Created by [`Psu::session`]. Dropping the guard disconnects the device on
/// every exit path, including early returns and panics; a failed disconnect
/// during drop is logged. Use [`close`](Self::close) to observe the result.
///
/// # Examples
///
/// ```
/// # use std::sync::Arc;
/// # use psu_lib::{adapter::SimAdapter, config::YamlConfigLoader, Psu};
/// # fn main() -> psu_lib::Result<()> {
/// let mut psu = Psu::new("RIGOL-DP832", SimAdapter::new(), Arc::new(YamlConfigLoader::bundled()?))?;
/// {
///     let mut session = psu.session()?;
///     session.set_current_limit(0.5)?;
/// }
/// assert_eq!(psu.get_state(), "disconnected");
/// assert!(psu.set_current_limit(0.5).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PsuSession<'a, A: Adapter, S: PsuStrategy> {
    psu: &'a mut Psu<A, S>,
    open: bool,
}

impl<'a, A: Adapter, S: PsuStrategy> PsuSession<'a, A, S> {
    pub(crate) fn open(psu: &'a mut Psu<A, S>) -> Result<Self> {
        psu.connect()?;
        Ok(Self { psu, open: true })
    }

    /// Disconnects the device and ends the session.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connection` if the adapter fails to disconnect.
    pub fn close(mut self) -> Result<()> {
        self.open = false;
        self.psu.disconnect()
    }
}

impl<A: Adapter, S: PsuStrategy> Deref for PsuSession<'_, A, S> {
    type Target = Psu<A, S>;

    fn deref(&self) -> &Self::Target {
        self.psu
    }
}

impl<A: Adapter, S: PsuStrategy> DerefMut for PsuSession<'_, A, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.psu
    }
}

impl<A: Adapter, S: PsuStrategy> Drop for PsuSession<'_, A, S> {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        if let Err(e) = self.psu.disconnect() {
            tracing::warn!(model = %self.psu.model(), error = %e, "Disconnect at end of session failed");
        }
    }
}
