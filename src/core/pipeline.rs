//! End-to-end pipeline: part records to costed groups

use miette::Diagnostic;
use thiserror::Error;

use crate::core::aggregate::SummaryRow;
use crate::core::cost::CostReport;
use crate::core::price::PriceTable;
use crate::core::quantity::QuantityRow;
use crate::core::record::{PartRecord, RecordError};
use crate::core::session::Session;

#[derive(Debug, Error, Diagnostic)]
pub enum PipelineError {
    #[error("no eligible part records found")]
    #[diagnostic(
        code(partcost::pipeline::empty),
        severity(Warning),
        help(
            "eligible lines have at least 14 tab-separated fields \
             and the marker in the first field"
        )
    )]
    EmptyResult,
}

/// Everything a pipeline run produces
#[derive(Debug, Default)]
pub struct PipelineOutput {
    pub quantities: Vec<QuantityRow>,
    /// Records that could not be computed
    pub rejected: Vec<RecordError>,
    pub summary: Vec<SummaryRow>,
    pub report: CostReport,
}

/// Run every stage over a batch of records
///
/// Halts before aggregation when there are no records. Costing never halts:
/// groups without a price row cost zero.
pub fn run_pipeline(
    records: &[PartRecord],
    prices: &PriceTable,
) -> Result<PipelineOutput, PipelineError> {
    let session = Session::try_from_records(records)?;
    let summary = session.summary();
    let report = session.cost(prices);

    tracing::info!(
        rows = session.rows().len(),
        rejected = session.rejected().len(),
        groups = summary.len(),
        grand_total = report.grand_total,
        "pipeline finished"
    );

    Ok(PipelineOutput {
        quantities: session.rows().to_vec(),
        rejected: session.rejected().to_vec(),
        summary,
        report,
    })
}
