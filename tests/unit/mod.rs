//! Unit tests for individual components

mod config_test;
mod util_test;
mod builders_test;
