//! Integration test suite for stackctl.
//!
//! These tests exercise the orchestrator end to end against fake runtime and
//! probe implementations: dependency ordering, failure isolation, running-set
//! semantics, cancellation, and generated-file setup.
//!
//! # Test Categories
//!
//! - `orchestration`: start/stop/restart/status sequencing
//! - `setup_files`: generated configuration files and directories
//!
//! # CI Compatibility
//!
//! No test here talks to a real container runtime or opens network
//! connections; everything runs against fakes and temp directories.


mod orchestration;
