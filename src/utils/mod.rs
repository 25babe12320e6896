//! Shared helpers for serving, jobs and views.

pub mod exec;
pub mod html;
pub mod mime;
pub mod path;
