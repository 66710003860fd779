// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Constructor entry point (`WebSocket`).

use super::Observed;
use crate::types::{ApiKind, Target, WEBSOCKET_METHOD};

/// Something that opens a socket connection from a target and sub-protocols.
pub trait SocketConstructor {
    type Socket;

    fn construct(&self, url: Target, protocols: Vec<String>) -> Self::Socket;
}

impl<S: SocketConstructor> SocketConstructor for Observed<S> {
    type Socket = S::Socket;

    fn construct(&self, url: Target, protocols: Vec<String>) -> Self::Socket {
        self.notify(ApiKind::WebSocket, WEBSOCKET_METHOD, url.clone());
        self.original().construct(url, protocols)
    }
}
