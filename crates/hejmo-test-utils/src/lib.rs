// SPDX-FileCopyrightText: 2026 Hejmo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Hejmo integration tests.
//!
//! Provides mock collaborators for fast, deterministic, CI-runnable tests
//! without external services.
//!
//! # Components
//!
//! - [`MockRemoteStore`] - In-memory document/credential/blob store with
//!   live query re-emission, scripted failures, and call counters
//! - [`MockNavigator`] - Navigation collaborator that records route intents

pub mod mock_navigator;
pub mod mock_store;

pub use mock_navigator::MockNavigator;
pub use mock_store::MockRemoteStore;
