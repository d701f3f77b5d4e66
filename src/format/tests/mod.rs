//! Unit tests for the metadata model and file I/O.
//!
//! These tests verify the exact JSON layout of the batch file and round-trips
//! through the filesystem.

mod file_tests;
mod metadata_tests;
