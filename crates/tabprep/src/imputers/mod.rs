//! Missing-value imputation.
//!
//! - [`StatisticalImputer`] fills a column with its global mode
//! - [`GroupedImputer`] fills a column per group with mode, median or mean

mod grouped;
mod statistical;

pub use grouped::{GroupFillOutcome, GroupedImputer};
pub use statistical::{FillValue, ModeFill, StatisticalImputer};
