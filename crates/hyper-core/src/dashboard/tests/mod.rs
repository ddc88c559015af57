#![cfg(test)]

mod dashboard_tests;
