//! Helper functions shared by the renderers and templates
//!
//! Escaping, URL building, localized dates and page metadata.

mod date;
mod html;
pub mod meta;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
