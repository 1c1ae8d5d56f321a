//! Step definitions for Cucumber behavioural tests.

mod reassembly_steps;
