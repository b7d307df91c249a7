//! Markdown report assembly: cover, per-sector analysis, portfolio method.

use anyhow::{Context, Result};
use chrono::Utc;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

use crate::api::NarrativeClient;
use crate::models::{GroupKey, PortfolioPlan, SecurityRecord};
use crate::portfolio::aggregator;

use super::charts::render_metric_charts;
use super::prompts::{sector_analysis_prompt, ALLOCATION_METHOD_PROMPT};

const CHART_LIMIT: usize = 10;

/// Builds the research report, asking the narrative client for the
/// free-text sections.
pub struct ReportGenerator {
    narrative: NarrativeClient,
}

impl ReportGenerator {
    pub fn new(narrative: NarrativeClient) -> Self {
        Self { narrative }
    }

    /// Assemble the full report for one run and write it to `output`.
    ///
    /// One section per sector (industry-level charts plus generated
    /// analysis), then the portfolio section with the allocation table.
    pub async fn build_report(
        &self,
        records: &[SecurityRecord],
        plan: &PortfolioPlan,
        output: &Path,
    ) -> Result<()> {
        let sectors: BTreeSet<&str> = records.iter().map(|r| r.sector.as_str()).collect();

        let mut doc = cover_section("Report On Analysis of S&P 500 Stocks");

        for sector in sectors {
            info!(sector = %sector, "building sector section");

            let metrics = aggregator::aggregate(records, Some(sector), GroupKey::Industry)
                .with_context(|| format!("Failed to aggregate metrics for sector {sector}"))?;
            let charts = render_metric_charts(&metrics, CHART_LIMIT);

            let prompt = sector_analysis_prompt(&metrics)?;
            let analysis = self
                .narrative
                .generate(&prompt)
                .await
                .with_context(|| format!("Failed to generate analysis for sector {sector}"))?;

            doc.push_str(&sector_section(sector, &charts, &analysis));
        }

        let method = self
            .narrative
            .generate(ALLOCATION_METHOD_PROMPT)
            .await
            .context("Failed to generate the portfolio method description")?;
        doc.push_str(&portfolio_section(&method, plan));

        std::fs::write(output, doc)
            .with_context(|| format!("Failed to write report to {}", output.display()))?;

        info!(path = %output.display(), "report written");
        Ok(())
    }
}

/// Cover block: title and run date.
fn cover_section(title: &str) -> String {
    format!("# {title}\n\n_{}_\n\n---\n\n", Utc::now().format("%Y-%m-%d"))
}

/// One sector's section: heading, intro line, charts, analysis text.
fn sector_section(sector: &str, charts: &str, analysis: &str) -> String {
    format!(
        "## Analysis of {sector} Sector\n\n\
         Below is a financial analysis of the investment trends in the {sector} Sector.\n\n\
         {charts}\n{}\n\n---\n\n",
        analysis.trim()
    )
}

/// The closing section: method explanation and the allocation table.
fn portfolio_section(method: &str, plan: &PortfolioPlan) -> String {
    format!(
        "## Portfolio Optimization\n\n\
         ### Technique\n\n{}\n\n\
         ### Allocation\n\n```\n{plan}```\n",
        method.trim()
    )
}
