//! # Batch Conversion
//!
//! Converts many files at once. Each file gets its own [`Pipeline`] on a
//! rayon worker; runs share nothing, so one bad file does not stop the rest.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::info;

use crate::error::ZplError;
use crate::pipeline::{Conversion, ConvertOptions, Pipeline};

/// Extension given to planned output files.
pub const OUTPUT_EXTENSION: &str = "zpl";

/// One input/output pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// What happened to one job.
#[derive(Debug)]
pub struct BatchOutcome {
    pub job: BatchJob,
    pub result: Result<Conversion, ZplError>,
}

/// Place one `.zpl` output per input in `out_dir`.
///
/// Outputs are named after the input stem. When that name is already taken
/// (`logo.png`, `logo.jpg`) the full file name is tried next
/// (`logo.jpg.zpl`), then numbered stems (`logo-2.zpl`, `logo-3.zpl`, ...).
/// No two jobs share an output path.
///
/// ```
/// use std::path::{Path, PathBuf};
/// use zplgfa::batch::plan;
///
/// let jobs = plan(&[PathBuf::from("a/logo.png"), PathBuf::from("b/logo.jpg")], Path::new("out"));
/// assert_eq!(jobs[0].output, Path::new("out/logo.zpl"));
/// assert_eq!(jobs[1].output, Path::new("out/logo.jpg.zpl"));
/// ```
pub fn plan(inputs: &[PathBuf], out_dir: &Path) -> Vec<BatchJob> {
    let mut taken: HashSet<PathBuf> = HashSet::new();

    inputs
        .iter()
        .map(|input| {
            let stem = input.file_stem().map(OsString::from).unwrap_or_default();
            let file_name = input.file_name().map(OsString::from).unwrap_or_default();

            let numbered = (2u64..).map(|n| {
                let mut name = stem.clone();
                name.push(format!("-{}", n));
                name
            });
            let output = [stem.clone(), file_name]
                .into_iter()
                .chain(numbered)
                .map(|name| output_path(out_dir, name))
                .find(|candidate| !taken.contains(candidate))
                .unwrap_or_default();
            taken.insert(output.clone());

            BatchJob {
                input: input.clone(),
                output,
            }
        })
        .collect()
}

/// `out_dir/name.zpl`, keeping any extension already in `name`.
fn output_path(out_dir: &Path, name: OsString) -> PathBuf {
    let mut file = name;
    file.push(".");
    file.push(OUTPUT_EXTENSION);
    out_dir.join(file)
}

/// Run every job in parallel.
///
/// DPI values are checked once, before any file is touched. Outcomes come
/// back in job order.
pub fn run(jobs: Vec<BatchJob>, options: &ConvertOptions) -> Result<Vec<BatchOutcome>, ZplError> {
    options.scale_factor()?;
    info!(jobs = jobs.len(), "Starting batch");

    let outcomes: Vec<BatchOutcome> = jobs
        .into_par_iter()
        .map(|job| {
            let result = Pipeline::new(options.clone())
                .and_then(|mut pipeline| pipeline.run_file(&job.input, &job.output));
            BatchOutcome { job, result }
        })
        .collect();

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    info!(
        converted = outcomes.len() - failed,
        failed,
        "Batch finished"
    );
    Ok(outcomes)
}
