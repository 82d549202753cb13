//! Photo emotion classification and identity recognition
//!
//! Classifies the primary face of an uploaded photo from the expression
//! likelihoods of an external face-detection provider, and identifies people
//! by polling a social-graph recognition pipeline with a bounded retry budget.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
