//! Integration test harness — shared mocks + scenario modules.

mod mock_hw;
mod report_cycle_tests;
