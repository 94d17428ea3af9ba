// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI subsystem: build pipeline and terminal reporting

pub mod reporter;
pub mod runner;

pub use reporter::Reporter;
pub use runner::{export_assembly, part_path, BuildReport, Runner, MANIFEST_FILE};
