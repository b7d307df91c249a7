//! Report assembly: text charts, prompt templates, and the Markdown
//! document builder.

mod charts;
mod generator;
mod prompts;

pub use charts::render_metric_charts;
pub use generator::ReportGenerator;
