//! Shared fixtures and HTML builders for tests.
