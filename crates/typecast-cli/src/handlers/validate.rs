//! Validation command handler

use crate::cli::ValidateArgs;
use crate::error::Result;
use crate::output::OutputWriter;
use serde::Serialize;
use tracing::instrument;
use typecast_core::{Kind, TypecastPlan};

/// One row of the reported output schema
#[derive(Debug, Serialize)]
pub struct SchemaRow {
    pub index: usize,
    pub name: String,
    pub input: Kind,
    pub output: Kind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
}

/// Handle the validate command
#[instrument(skip(output), fields(config = %args.config.display()))]
pub fn handle_validate(args: ValidateArgs, output: &mut OutputWriter) -> Result<()> {
    output.info(&format!("Validating job file: {}", args.config.display()))?;
    let (_, plan) = super::load_job(&args.config)?;
    output.success("✓ Job file is valid")?;

    let rows = schema_rows(&plan);
    output.section("Output Schema")?;
    match output.format() {
        crate::cli::OutputFormat::Human => {
            let table: Vec<Vec<String>> = rows
                .iter()
                .map(|row| {
                    vec![
                        row.index.to_string(),
                        row.name.clone(),
                        row.input.to_string(),
                        row.output.to_string(),
                        row.paths.join(", "),
                    ]
                })
                .collect();
            output.table(&["#", "NAME", "INPUT", "OUTPUT", "PATHS"], &table)
        }
        _ => output.data(&rows),
    }
}

pub fn schema_rows(plan: &TypecastPlan) -> Vec<SchemaRow> {
    plan.columns()
        .iter()
        .map(|spec| {
            let mut paths: Vec<String> = plan
                .index()
                .leaves_under(&spec.column.name)
                .filter_map(|leaf| plan.index().is_leaf(leaf).map(|kind| format!("{} {}", leaf, kind)))
                .collect();
            paths.sort();
            SchemaRow {
                index: spec.column.index,
                name: spec.column.name.clone(),
                input: spec.column.kind,
                output: spec.output_kind(),
                paths,
            }
        })
        .collect()
}
