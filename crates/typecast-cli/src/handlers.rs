//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

pub mod completions;
pub mod run;
pub mod validate;

use crate::config::JobConfig;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use std::path::Path;
use tracing::{debug, info};
use typecast_core::TypecastPlan;

/// Load a job file and validate it against its own input schema
pub(crate) fn load_job(path: &Path) -> Result<(JobConfig, TypecastPlan)> {
    let _timer = Timer::with_details("load_job", &format!("file: {}", path.display()));

    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let job = JobConfig::from_path(path)?;
    debug!(
        input_columns = job.input_schema.len(),
        rules = job.filter.columns.len(),
        "job file decoded"
    );

    let plan = TypecastPlan::build(&job.filter, &job.schema()?)?;
    info!(
        columns = plan.columns().len(),
        paths = plan.index().len(),
        stop_on_invalid_record = plan.stop_on_invalid_record(),
        "plan ready"
    );
    Ok((job, plan))
}
