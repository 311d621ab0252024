pub mod enrich;
pub mod summarize;

pub use enrich::enrich_funders;
pub use summarize::SummaryGenerator;
