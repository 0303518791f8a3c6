use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

/// Judged relevance levels for one query. Negative levels mark documents
/// that were pooled but never assessed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryJudgments {
    pub query_id: String,
    pub levels: HashMap<String, i32>,
}

impl QueryJudgments {
    pub fn new(query_id: impl Into<String>) -> Self {
        Self {
            query_id: query_id.into(),
            levels: HashMap::new(),
        }
    }

    pub fn with_levels<'a>(
        query_id: impl Into<String>,
        levels: impl IntoIterator<Item = (&'a str, i32)>,
    ) -> Self {
        Self {
            query_id: query_id.into(),
            levels: levels
                .into_iter()
                .map(|(doc_id, level)| (doc_id.to_string(), level))
                .collect(),
        }
    }

    /// Level of a judged document; `None` for absent or unassessed ones.
    pub fn judged_level(&self, doc_id: &str) -> Option<u32> {
        self.levels
            .get(doc_id)
            .and_then(|level| u32::try_from(*level).ok())
    }
}

/// Retrieved documents for one query, best first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedResults {
    pub query_id: String,
    pub doc_ids: Vec<String>,
}

impl RankedResults {
    pub fn new<'a>(query_id: impl Into<String>, doc_ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            query_id: query_id.into(),
            doc_ids: doc_ids.into_iter().map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct JudgmentSet {
    pub queries: BTreeMap<String, QueryJudgments>,
    pub judgment_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RunSet {
    pub run_id: Option<String>,
    pub queries: BTreeMap<String, RankedResults>,
    pub line_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportInput {
    pub path: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportParameters {
    pub relevance_level: u32,
    pub unjudged_policy: String,
    pub complete: bool,
    pub max_docs_per_query: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeasure {
    pub name: String,
    pub params: Vec<i64>,
    pub slots: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportQueryRow {
    pub query_id: String,
    pub values: BTreeMap<String, Option<f64>>,
    pub failures: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportFinalRow {
    pub name: String,
    pub value: f64,
    pub num_queries: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub manifest_version: u32,
    pub generated_at: String,
    pub run_id: Option<String>,
    pub qrels: ReportInput,
    pub run: ReportInput,
    pub parameters: ReportParameters,
    pub measures: Vec<ReportMeasure>,
    pub per_query: Vec<ReportQueryRow>,
    pub finals: Vec<ReportFinalRow>,
}
