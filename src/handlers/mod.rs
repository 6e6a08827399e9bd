pub mod analysis;

pub use analysis::{AnalysisHandler, AnalysisSettings};
