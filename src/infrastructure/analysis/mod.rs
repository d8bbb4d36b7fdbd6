//! Analysis service infrastructure module

mod http;

pub use http::HttpInvoiceAnalyzer;
