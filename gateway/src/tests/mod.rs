//! Unit tests for gateway building blocks

pub mod config;
