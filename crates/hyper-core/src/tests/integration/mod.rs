#![cfg(test)]

pub mod common;
pub mod container_tests;
pub mod dashboard_tests;
pub mod plugin_tests;
