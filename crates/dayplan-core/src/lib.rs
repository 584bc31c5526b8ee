//! Core of dayplan: the task model, per-day projections, copy rules and
//! storage contracts. Front ends and storage backends live in other crates.

pub mod collection;
pub mod copy;
pub mod drag;
pub mod navigation;
pub mod projection;
pub mod storage;
pub mod tasks;
pub mod timer;
