//! Recognition side of the fixing pipeline: locating candidate entries and
//! classifying them.

pub mod inspector;
pub mod locator;

pub use inspector::{classify, field_value, proxy_fields, trailing_shape, ProxyFields, TrailingShape};
pub use locator::{locate_entries, locate_entries_with, EntryLocator, LocatorOptions};
