// SPDX-FileCopyrightText: 2026 Hejmo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Navigation collaborator trait.

use crate::types::Route;

/// Receives opaque route intents from the session layer.
///
/// Intents are idempotent to emit repeatedly with the same target: the
/// presentation layer is expected to no-op on a redundant request to the
/// current route. The core does not suppress duplicates.
pub trait Navigator: Send + Sync + 'static {
    /// Request navigation to `route`.
    fn navigate(&self, route: Route);
}
