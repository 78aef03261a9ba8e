//! docmerge: scheduled mail-merge pipeline.
//!
//! Downloads a spreadsheet and a document template from cloud storage,
//! renders one document per spreadsheet row by substituting `{{field}}`
//! placeholders, optionally converts the result (e.g. to PDF), and uploads
//! everything back on a fixed interval.
//!
//! All remote transfers go through the external sync tool behind
//! [`remote::Remote`]; all format conversion goes through the external
//! converter behind [`convert::Convert`]. Both traits ship mocks for tests.

pub mod batch;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod load_config;
pub mod remote;
pub mod render;
pub mod scheduler;
pub mod spreadsheet;
