//! Tests for rate-limit and token entities

mod token_record_tests;
