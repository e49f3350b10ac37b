//! Tests for the command line front end
//!
//! - `scenario_files` - YAML loading, saving and preset export
//! - `reports` - text and JSON output

mod scenario_files;
