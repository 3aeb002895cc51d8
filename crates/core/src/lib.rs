//! Core library: extraction, aggregation, reconciliation and reporting for
//! tag vocabulary / folder taxonomy audits.

pub mod aggregate;
pub mod config;
pub mod console;
pub mod error;
pub mod extractor;
pub mod lexer;
pub mod models;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod strategy;
