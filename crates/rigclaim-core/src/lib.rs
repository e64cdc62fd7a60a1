//! Core types and logic for the rigclaim intake site.
//!
//! Two independent pieces live here: the multi-step lead-intake form
//! ([`wizard::IntakeForm`]) with its validation and qualification rules, and
//! the client-local photo evidence catalog ([`catalog::EvidenceCatalog`]).
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::LocalStore`]; lead receivers implement
//! [`submission::LeadSink`].

pub mod blob;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod evidence;
pub mod intake;
pub mod qualify;
pub mod schedule;
pub mod store;
pub mod submission;
pub mod validate;
pub mod wizard;

pub use error::{Error, Result};
