//! Fixed instruction templates for narrative generation.

use anyhow::{Context, Result};

use crate::models::MetricsTable;

/// Instruction template for per-sector analysis. The serialized metrics
/// table is prepended; the generated text is embedded verbatim.
pub const SECTOR_ANALYSIS_PROMPT: &str = "\
Above is JSON data with financial metrics for different industries including P/E ratio, \
dividend yield, market cap, and 1-year returns. Create a consolidated financial analysis \
that strictly focuses only on industries that represent either top investment opportunities \
or very poor investment prospects based on the provided metrics. Highlight important \
positive or negative trends for these selected industries only, explaining what these \
trends mean for their financial health and market performance. Do not include industries \
that fall into moderate or average performance categories. Do not add any commentary \
beyond what is explicitly requested. Be as concise as possible without loss of information.

Output must be Markdown in this format:

**Top Investment Opportunities:**

**{industry name}**: {industry analysis summary}

**Bad Investment Opportunities:**

**{industry name}**: {industry analysis summary}
";

/// Instruction template for the portfolio-method section.
pub const ALLOCATION_METHOD_PROMPT: &str = "\
The original method is:

* First, group stocks into sectors.
* Assign each sector a weight that is inversely proportional to its volatility (sector beta).
* Within each sector, give each stock a weight proportional to its share of profit margin in that sector.
* Multiply the sector weight by the stock's weight to get the final stock weight.
* Use these final weights for weighted fund allocation, buying whole shares only.

Rewrite this description of a portfolio optimization method into no more than 5 logical, \
easy-to-read, non-technical steps. Do not provide any other output than what is strictly asked.

Each step must be Markdown in this format:

{serial number}. **{step header}**
{1-2 line step description}
";

/// Build the per-sector analysis prompt: serialized metrics, then the fixed
/// template.
pub fn sector_analysis_prompt(metrics: &MetricsTable) -> Result<String> {
    let serialized = serde_json::to_string_pretty(metrics)
        .context("Failed to serialize metrics table for prompt")?;

    Ok(format!("{serialized}\n\n{SECTOR_ANALYSIS_PROMPT}"))
}
