//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, phases, errors)
//! - `catalog` - Items and adjectives a survey draws from
//! - `survey` - Trial sequencing and the session state machine
//! - `responses` - Tabular schema and CSV export of decisions

pub mod catalog;
pub mod foundation;
pub mod responses;
pub mod survey;
