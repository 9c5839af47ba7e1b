// SPDX-FileCopyrightText: 2026 Hejmo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session and role resolution for the Hejmo marketplace client.
//!
//! Wraps the remote store's credential-event stream in a sequential state
//! machine that resolves a raw credential into an authorized session with a
//! role, publishing settled state over a `watch` channel and emitting
//! navigation intents as transition side effects.

pub mod controller;

pub use controller::SessionController;
