//! Integration tests for Sitewalk
//!
//! These tests use wiremock to create mock HTTP servers and exercise the
//! real reqwest fetcher and the full crawl cycle end-to-end.

mod crawl_tests;
mod fetcher_tests;
