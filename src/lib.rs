//! Black-box checks for the ZTest framework: run an interpreter against
//! fixture scripts and compare what comes back with declared expectations.

pub mod ascii_tree;
pub mod expectation;
pub mod formats;
pub mod suite;
pub mod test_case;
pub mod test_id;
pub mod test_result;
pub mod test_runner;
pub mod toml_config;
pub mod utils;
