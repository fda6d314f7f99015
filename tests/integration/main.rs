//! Integration tests for FAQ Harvester
//!
//! These tests use wiremock to stand up mock FAQ sites and exercise the
//! fetcher and the full crawl cycle end-to-end.

mod crawl_tests;
