//! partcost: cabinet parts costing
//!
//! Turns the tab-delimited parts export of a cabinet design tool into
//! per-part quantities, groups them by type, door model and colour, and
//! prices each group from a CSV price table.

pub mod cli;
pub mod core;
