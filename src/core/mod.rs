//! Core library modules for iconify-dl
//!
//! This module contains the internal implementation details of the iconify-dl library.

pub mod error;
pub mod catalog;
pub mod render;
pub mod pipeline;
