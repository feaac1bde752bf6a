//! Output file verification
//!
//! Reads a finished output file back and checks what a run guarantees no
//! matter how producers interleaved: every line is well formed, and each
//! producer's lines appear in strictly increasing write order.
//!
//! Whether every line arrived is reported separately by
//! [`VerifyReport::is_complete`], since failed appends legitimately drop lines.

use crate::core::{ParsedLine, PipelineError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub total_lines: u64,
    /// Line count per producer index
    pub per_producer: BTreeMap<usize, u64>,
}

impl VerifyReport {
    /// Every producer contributed exactly `writes` lines
    pub fn is_complete(&self, producers: usize, writes: u64) -> bool {
        self.total_lines == producers as u64 * writes
            && (0..producers).all(|p| self.per_producer.get(&p).copied().unwrap_or(0) == writes)
    }
}

/// Check the output of a run with `producers` producers of `writes` lines each
pub fn verify_output(
    path: impl AsRef<Path>,
    producers: usize,
    writes: u64,
) -> Result<VerifyReport> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        PipelineError::io_operation(
            "verifying output",
            format!("cannot open '{}'", path.display()),
            e,
        )
    })?;

    let mut last_write: BTreeMap<usize, u64> = BTreeMap::new();
    let mut per_producer: BTreeMap<usize, u64> = BTreeMap::new();
    let mut total_lines = 0;

    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        let number = number + 1;

        let parsed = ParsedLine::parse(&line).ok_or_else(|| {
            PipelineError::verification(format!("line {} is malformed: {:?}", number, line))
        })?;

        if parsed.producer_index >= producers {
            return Err(PipelineError::verification(format!(
                "line {} names producer {} but only {} ran",
                number, parsed.producer_index, producers
            )));
        }
        if parsed.write_index == 0 || parsed.write_index > writes {
            return Err(PipelineError::verification(format!(
                "line {} has write index {} outside 1..={}",
                number, parsed.write_index, writes
            )));
        }

        let previous = last_write.insert(parsed.producer_index, parsed.write_index);
        if let Some(previous) = previous {
            if parsed.write_index <= previous {
                return Err(PipelineError::verification(format!(
                    "line {}: producer {} wrote {} after {}",
                    number, parsed.producer_index, parsed.write_index, previous
                )));
            }
        }

        *per_producer.entry(parsed.producer_index).or_insert(0) += 1;
        total_lines += 1;
    }

    Ok(VerifyReport {
        total_lines,
        per_producer,
    })
}
