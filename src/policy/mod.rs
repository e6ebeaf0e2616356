//! Learned value tables and their persistence
//!
//! A [`PolicyStore`] owns one [`PolicyTable`] per learning algorithm plus the
//! run metadata, and reads/writes the text format defined in [`format`].

pub mod format;
pub mod store;
pub mod table;

pub use format::PolicyDocument;
pub use store::{PolicyMetadata, PolicyStore, Strategy};
pub use table::PolicyTable;
