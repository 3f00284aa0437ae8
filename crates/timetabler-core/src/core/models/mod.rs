//! Read-only domain entities consumed by the engine.
//!
//! - **Identity** ([`ids`], [`teacher`]) - typed ids and the [`teacher::HumanKey`] grouping
//!   teacher records that describe one person
//! - **Entities** ([`subject`], [`section`], [`requirement`], [`concurrent`])
//! - **Time** ([`calendar`]) - instructional days and the shared weekly slot axis
//! - **Aggregates** ([`snapshot`], [`schedule`]) - the engine's input and its result

pub mod calendar;
pub mod concurrent;
pub mod ids;
pub mod requirement;
pub mod schedule;
pub mod section;
pub mod snapshot;
pub mod subject;
pub mod teacher;
