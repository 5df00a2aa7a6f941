//! Core types, bookkeeping rules and the store trait for Cadenza.
//!
//! No HTTP or database dependencies. Leveling, repertoire transitions, the
//! connection handshake and streaks are pure functions over explicit state;
//! storage backends call them inside their own transactions.

pub mod account;
pub mod catalog;
pub mod challenge;
pub mod error;
pub mod event;
pub mod mission;
pub mod practice;
pub mod profile;
pub mod progression;
pub mod repertoire;
pub mod settings;
pub mod social;
pub mod store;

pub use error::{DomainError, Error, Result};
