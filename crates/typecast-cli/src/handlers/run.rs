//! Run command handler

use crate::cli::RunArgs;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use crate::records::RecordCodec;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use tracing::{debug, info, instrument, warn};
use typecast_core::{ColumnDispatcher, StatsSnapshot};

/// Handle the run command
#[instrument(skip(output), fields(config = %args.config.display()))]
pub fn handle_run(args: RunArgs, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::new("run_command");
    let (job, plan) = super::load_job(&args.config)?;
    let codec = RecordCodec::new(&job, &plan)?;
    let dispatcher = ColumnDispatcher::new(plan);

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => {
            if !path.exists() {
                return Err(Error::FileNotFound { path: path.clone() });
            }
            debug!("Reading records from {}", path.display());
            Box::new(BufReader::new(File::open(path)?))
        }
        None => {
            debug!("Reading records from stdin");
            Box::new(io::stdin().lock())
        }
    };

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let stats = transform(&dispatcher, &codec, reader, writer)?;
    info!(
        records = stats.records,
        nulled_columns = stats.nulled_columns,
        missing_paths = stats.missing_paths,
        "run finished"
    );

    if stats.nulled_columns > 0 {
        output.warning(&format!(
            "{} column value(s) were set to null after failed casts",
            stats.nulled_columns
        ))?;
    }
    if let Some(path) = &args.output {
        output.success(&format!("✓ Records written to {}", path.display()))?;
    }
    output.stats(&stats)
}

/// Process every non-blank line of `reader` into `writer`
pub fn transform<R: BufRead, W: Write>(
    dispatcher: &ColumnDispatcher,
    codec: &RecordCodec,
    reader: R,
    mut writer: W,
) -> Result<StatsSnapshot> {
    let mut unrendered = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let record = codec.decode(number, &line)?;
        let processed = dispatcher.process_owned(record).map_err(|source| {
            warn!(line = number, "record rejected");
            Error::Record { line: number, source }
        })?;
        let encoded = codec.encode(processed)?;
        unrendered += encoded.nulled_columns;
        writeln!(writer, "{}", encoded.line)?;
    }
    writer.flush()?;

    let mut stats = dispatcher.stats();
    stats.nulled_columns += unrendered;
    Ok(stats)
}
