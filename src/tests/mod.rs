//! Test-only support shared by the module test suites.

pub(crate) mod fake_broker;
