//! Decode-and-detect pipeline for suspicious links and user-entered text.
//!
//! Two call sites share one [`decode::Decoder`] and one [`rules::RuleEngine`],
//! configured differently:
//!
//! - [`analyzer::UrlAnalyzer`] scores a URL and optionally merges remote
//!   enrichment into a [`analyzer::Report`].
//! - [`shield::InputShield`] strips XSS and SQL-injection payloads from form
//!   input while keeping the readable text around them.

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod decode;
pub mod error;
pub mod rules;
pub mod sanitize;
pub mod score;
pub mod shield;
pub mod storage;
pub mod verdict;

pub use error::{Result, ShieldError};
