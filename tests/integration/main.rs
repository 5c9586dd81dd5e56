//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the controller service
//! against the recording mocks in `mock_hw`.  All tests run on the host
//! (x86_64) with no real hardware or broker required.

mod command_tests;
mod identity_tests;
mod mock_hw;
mod service_tests;
