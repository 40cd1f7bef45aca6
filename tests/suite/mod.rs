//! Integration suite modules.

mod identity;
mod panel;
mod rename;
