//! Shared test infrastructure.

mod context;
mod db;
mod helpers;

pub(crate) use context::TestContext;
