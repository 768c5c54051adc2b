//! Rendering of analysis results for the terminal (text) and for tools (JSON).

use serde::Serialize;

use crate::band::{badge, meter_position, RiskBand};
use crate::error::Result;
use crate::AnalysisResult;

const METER_WIDTH: usize = 40;

#[derive(Debug, Clone, Serialize)]
pub struct Report<'a> {
    pub source: &'a str,
    pub band: RiskBand,
    pub badge: String,
    #[serde(flatten)]
    pub analysis: &'a AnalysisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<&'a str>,
}

impl<'a> Report<'a> {
    pub fn new(source: &'a str, analysis: &'a AnalysisResult, answer: Option<&'a str>) -> Self {
        Self {
            source,
            band: analysis.band(),
            badge: badge(analysis.risk_score),
            analysis,
            answer,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_text(&self) -> String {
        let a = self.analysis;
        let mut out = format!("== {} ==\n\nSummary\n  {}\n", self.source, a.summary);
        if !a.highlights.is_empty() {
            out.push_str(&format!("  [{}]\n", a.highlights.join("] [")));
        }

        out.push_str(&format!("\nRisk assessment: {}\n", self.badge));
        out.push_str(&format!("  {}\n", meter(a.risk_score)));
        for risk in &a.risks {
            out.push_str(&format!("  ! {risk}\n"));
        }

        out.push_str("\nReview & advice\n");
        for (i, tip) in a.advice.iter().enumerate() {
            out.push_str(&format!("  Suggestion {}: {tip}\n", i + 1));
        }

        if let Some(answer) = self.answer {
            out.push_str(&format!("\nAnswer\n  {answer}\n"));
        }
        out
    }
}

/// A fixed-width bar with a pointer at the score's position.
pub fn meter(score: f64) -> String {
    let slot = (meter_position(score) / 100.0 * (METER_WIDTH - 1) as f64).round() as usize;
    let bar: String = (0..METER_WIDTH)
        .map(|i| if i == slot { '|' } else { '=' })
        .collect();
    format!("[{bar}] {}%", score.round())
}
