//! socedit: batch editor for Cougaar society XML files
//!
//! Loads a society description, strips database and experiment flags from every
//! node, switches nodes to XML initialization, drops topology reader servlets and
//! points the LDM SQL and GLS init components at local query files.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
