//! Core module - the parts costing pipeline and project plumbing

pub mod aggregate;
pub mod config;
pub mod cost;
pub mod formula;
pub mod normalize;
pub mod pipeline;
pub mod price;
pub mod project;
pub mod quantity;
pub mod record;
pub mod session;

pub use aggregate::{aggregate, GroupKey, SummaryRow};
pub use config::Config;
pub use cost::{cost, CostReport, CostRow};
pub use formula::{evaluate, Dimensions, Rule, RULES};
pub use normalize::normalize_type;
pub use pipeline::{run_pipeline, PipelineError, PipelineOutput};
pub use price::{PriceEntry, PriceTable, PriceTableError};
pub use project::{Project, ProjectError};
pub use quantity::{compute_quantities, QuantityRow, RowStatus};
pub use record::{filter_records, read_records, FilterOutcome, PartRecord, RecordError};
pub use session::{RowEdit, Session, SessionError};
