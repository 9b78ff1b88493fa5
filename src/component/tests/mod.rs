//! Component System Tests
//!
//! Loader and resolver suites driven through the in-process platform.

pub mod mock_components;



pub mod discovery_tests;
