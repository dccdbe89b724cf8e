//! Lead workflow: pipeline, numbering, stamping and assignment rules

pub mod assignment;
pub mod insights;
pub mod numbering;
pub mod pipeline;
pub mod ports;
pub mod stamping;

pub use insights::{LeadInsights, LeadOverview};
pub use numbering::ServiceNumberIssuer;
pub use pipeline::{LeadPipeline, PipelineStep, PIPELINE};
