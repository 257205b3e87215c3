//! Progress reporting for the ingest passes

use caseqa_core::IngestPhase;
use std::io::{self, Write};

/// Single-line progress reporter on stderr
#[derive(Default)]
pub struct ProgressReporter;

impl ProgressReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn update(&self, phase: IngestPhase, done: usize, total: usize) {
        eprint!("\r{:<50}", format!("{} {}/{}", phase, done, total));
        io::stderr().flush().ok();
    }

    pub fn finish(&self, imported: usize, total: usize) {
        eprintln!("\rDone ({}/{})                    ", imported, total);
    }
}
