//! Invoice analysis domain module

mod result;

pub use result::{AnalysisResponse, AnalysisResult, Amount, ErrorResponse, Modality};
