//! Dereferencing engine and CLI for the Molecular Oncology Almanac

pub mod almanac;
pub mod cli;
pub mod config;
pub mod io;
pub mod services;
