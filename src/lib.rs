// Library root
// -----------
// The binary (`main.rs`) wires these modules into the interactive CLI.
//
// Module responsibilities:
// - `api`: HTTP calls to the upload and analysis endpoints.
// - `config`: YAML file plus environment overrides.
// - `description`: the analysis result and its rendering.
// - `error`: failure kinds shared by the library.
// - `ui`: the terminal flow that ties upload and analysis together.
pub mod api;
pub mod config;
pub mod description;
pub mod error;
pub mod ui;

pub use error::{Error, Result};
