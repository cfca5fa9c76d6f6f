//! Core domain for the session-auth service.
//!
//! Houses the credential and token codecs, the session entity, the store and
//! notifier contracts, and the session lifecycle protocol that ties them all
//! together. Nothing in this crate touches HTTP or a database; the
//! `warden-db` and `warden-api` crates plug concrete implementations into the
//! traits defined here.

pub mod error;
pub mod notify;
pub mod secret;
pub mod service;
pub mod session;
pub mod store;
pub mod token;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;
