//! XML persistence for society files

pub mod document;
pub mod society;

pub use document::{parse_document, write_document, XmlDeclaration, XmlDocument, XmlError};
pub use society::{society_from_element, society_to_element};
