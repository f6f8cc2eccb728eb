#[rustfmt::skip]
pub mod config;
pub mod gui;
