//! HTML pages

pub mod handlers;
