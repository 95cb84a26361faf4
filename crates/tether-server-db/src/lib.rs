// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database layer for the Tether server.
//!
//! Repositories wrap a shared [`SqlitePool`](sqlx::SqlitePool) and expose
//! their operations both as inherent methods and through store traits, so
//! higher layers can depend on `Arc<dyn AccountStore>` and swap in fakes
//! under test.

pub mod account;
pub mod error;
pub mod pool;
pub mod session;

#[cfg(test)]
pub mod testing;

pub use account::{AccountRepository, AccountStore};
pub use error::{CreateAccountError, DbError, Result};
pub use pool::{create_pool, run_migrations};
pub use session::{SessionRepository, SessionStore};
