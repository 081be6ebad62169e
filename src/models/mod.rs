//! Domain models for astro-bridge.
//!
//! # Core Concepts
//!
//! ## Inputs
//!
//! - [`BirthData`]: A moment and place as supplied by a client. Not yet resolved.
//! - [`ChartSubject`]: A resolved chart: the same moment and place plus the ecliptic
//!   longitude of every body. Produced by a chart provider, then only borrowed.
//!
//! ## Derived Values
//!
//! Recomputed on every render and never stored:
//!
//! - [`AspectMatch`]: One natal planet and one transit planet forming an aspect.
//!
//! ## Static Configuration
//!
//! - [`ASPECTS`]: The aspect table, in match-priority order.

mod aspect;
mod subject;

pub use aspect::*;
pub use subject::*;
