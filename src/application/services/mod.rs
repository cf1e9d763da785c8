//! Application services

pub mod editor;

pub use editor::{EditOutcome, LoadedSociety, SocietyEditor, Stage};
