//! Core data models for the application
//!
//! This module contains the data structures that flow through the fixing
//! pipeline, separated from the logic that operates on them.
//!
//! # Usage
//!
//! ```rust
//! use err_x509::models::{Classification, EntrySyntax};
//! use err_x509::parser::{classify, locate_entries};
//!
//! let doc = "proxies:\n  - { name: A, server: s.com, port: 443 }\n";
//! let candidates = locate_entries(doc);
//! assert_eq!(candidates[0].syntax, EntrySyntax::Flow);
//! assert_eq!(classify(&candidates[0]), Classification::NeedsFix);
//! ```

mod candidate;
mod summary;

pub use candidate::*;
pub use summary::*;
