//! Content records and the catalog they are registered in

pub mod catalog;

pub use catalog::{ContentCatalog, ContentDef};
