#![cfg(test)]

mod command_tests;
mod widget_tests;
