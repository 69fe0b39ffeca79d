//! Unit tests for the session directory
