pub mod client_tests;
pub mod support;
