//! Convenience re-exports of the standcycle workspace crates.
//!
//! Most users want `standcycle_century` (the growth and decomposition
//! engines) together with the tables and driver records from
//! `standcycle_core`; this crate bundles both under one name.

pub use standcycle_century as century;
pub use standcycle_core as core;
