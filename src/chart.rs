//! Chart hints
//!
//! Presentation metadata for a compiled query: what to draw and which
//! result columns go on which axis. Built only from a successful result,
//! so every axis names a column that is actually emitted.

use serde::Serialize;

use crate::compiler::CompileResult;
use crate::intent::{ChartType, QueryIntent};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartHints {
    pub chart_type: ChartType,
    pub title: String,
    /// Alias of the first emitted dimension
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<String>,
    /// Aliases of every emitted metric
    pub y_axis: Vec<String>,
}

impl ChartHints {
    /// `None` for a failed compilation. The title is the intent's
    /// `chartTitle`, else `question`.
    pub fn from_result(intent: &QueryIntent, result: &CompileResult, question: &str) -> Option<Self> {
        if !result.success {
            return None;
        }
        let title = intent
            .chart_title
            .clone()
            .unwrap_or_else(|| question.trim().to_string());

        Some(Self {
            chart_type: intent.chart_type,
            title,
            x_axis: result.dimension_aliases().next().map(str::to_string),
            y_axis: result.metric_aliases().map(str::to_string).collect(),
        })
    }
}
