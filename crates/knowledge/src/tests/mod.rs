//! Scenario tests for the search pipeline.
