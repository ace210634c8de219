//! RJQ: Rubber Joint Quoter
//!
//! Maintains a catalog of sphere bodies and flanges with priced models, and
//! assembles quotations from them as priced line items that can be saved,
//! reloaded and rendered as a printable report.

pub mod cli;
pub mod core;
pub mod logging;
pub mod report;
