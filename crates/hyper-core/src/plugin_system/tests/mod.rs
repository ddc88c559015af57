#![cfg(test)]


pub mod hooks_tests;
pub mod registry_tests;
