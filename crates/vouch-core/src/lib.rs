//! Core types and controllers for vouch, a manager for the trusted contacts
//! (nominees and trustees) attached to an account.
//!
//! This crate is deliberately free of HTTP, database and terminal
//! dependencies. Backends implement [`backend::Backend`]; front ends drive
//! [`list::ListController`] and [`form::FormController`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod asset;
pub mod backend;
pub mod contact;
pub mod dialog;
pub mod error;
pub mod filter;
pub mod form;
pub mod list;
pub mod schema;

pub use error::{Error, Result};

#[cfg(test)]
mod fake;
#[cfg(test)]
mod tests;
