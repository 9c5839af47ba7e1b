// SPDX-FileCopyrightText: 2026 Hejmo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock navigation collaborator that records route intents for assertion.

use std::sync::Mutex;

use hejmo_core::{Navigator, Route};

/// Captures every route intent the session layer emits, in order.
#[derive(Default)]
pub struct MockNavigator {
    intents: Mutex<Vec<Route>>,
}

impl MockNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// All intents recorded so far, oldest first.
    pub fn intents(&self) -> Vec<Route> {
        self.intents.lock().unwrap().clone()
    }

    /// The most recent intent, if any.
    pub fn last(&self) -> Option<Route> {
        self.intents.lock().unwrap().last().copied()
    }

    /// Forget recorded intents.
    pub fn clear(&self) {
        self.intents.lock().unwrap().clear();
    }
}

impl Navigator for MockNavigator {
    fn navigate(&self, route: Route) {
        self.intents.lock().unwrap().push(route);
    }
}
