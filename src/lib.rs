//! invoice-snap - photograph an invoice and extract its data
//!
//! This crate drives a camera capture flow: open the camera, take a still,
//! review it, and send it to an analysis service that returns the invoice's
//! company, category, amount and payment identifiers.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Flow states, capture value objects, analysis results, config
//! - **Application**: The capture flow use case and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (ffmpeg camera, JPEG encoder, HTTP client, config file)
//! - **CLI**: Command-line interface, argument parsing, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
