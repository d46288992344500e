//! Property test modules

mod launcher_tests;
mod validation_tests;
