#![cfg(test)]

mod config_tests;
