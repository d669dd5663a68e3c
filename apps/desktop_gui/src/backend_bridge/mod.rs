//! Backend side of the GUI: command types and the worker thread running them.

pub mod commands;
pub mod runtime;
