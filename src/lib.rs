//! # packy
//!
//! Convert between JSON and YAML maintaining key order, and wrap packer
//! execution, auto-translating YAML templates to JSON.
//!
//! The [`convert`] module is the core codec; [`cli`] drives it from the
//! command line (including the packer fallback path) and [`web`] exposes the
//! YAML-to-JSON direction as a one-route form.

pub mod cli;
pub mod config;
pub mod convert;
pub mod document;
pub mod tempfiles;
pub mod web;
