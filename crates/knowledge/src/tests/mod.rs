//! End-to-end conversation scenarios.

pub(crate) mod support;

mod scenarios;
