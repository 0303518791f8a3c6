use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::EvaluateArgs;
use gradeval::loader::{Compression, read_file};
use gradeval::measures::{
    EvalParams, Evaluator, MeasureSelection, QueryOutcome, UnjudgedPolicy, parse_selection,
};
use gradeval::model::{
    EvaluationReport, JudgmentSet, QueryJudgments, RankedResults, ReportFinalRow, ReportInput,
    ReportMeasure, ReportParameters, ReportQueryRow, RunSet,
};
use gradeval::trec_format::{parse_qrels, parse_run};
use gradeval::util::{now_utc_string, sha256_bytes, write_json_pretty};

const REPORT_MANIFEST_VERSION: u32 = 1;

pub fn run(args: EvaluateArgs) -> Result<()> {
    let params = EvalParams {
        relevance_level: args.relevance_level,
        unjudged: if args.judged_only {
            UnjudgedPolicy::JudgedOnly
        } else {
            UnjudgedPolicy::NonRelevant
        },
        max_docs_per_query: args.max_docs,
    };
    let selections = resolve_selections(&args.measures)?;
    let mut evaluator =
        Evaluator::new(params, selections).context("invalid evaluation configuration")?;

    let qrels_source = args.qrels.display().to_string();
    let qrels_bytes = read_file(&args.qrels)?;
    let judgments = parse_qrels(&qrels_bytes, &qrels_source)?;
    info!(
        path = %qrels_source,
        compression = Compression::from_path(&args.qrels).as_str(),
        queries = judgments.queries.len(),
        judgments = judgments.judgment_count,
        "loaded relevance judgments"
    );

    let run_source = args.run.display().to_string();
    let run_bytes = read_file(&args.run)?;
    let run = parse_run(&run_bytes, &run_source)?;
    info!(
        path = %run_source,
        compression = Compression::from_path(&args.run).as_str(),
        run_id = %run.run_id.clone().unwrap_or_default(),
        queries = run.queries.len(),
        lines = run.line_count,
        "loaded run"
    );

    let outcomes = evaluate_queries(&mut evaluator, &judgments, &run, args.complete);
    let failed = outcomes
        .iter()
        .filter(|outcome| !outcome.failures.is_empty())
        .count();
    info!(
        queries = outcomes.len(),
        failed_queries = failed,
        "evaluation completed"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.per_query {
        for outcome in &outcomes {
            for line in evaluator.single_lines(outcome) {
                writeln!(out, "{line}").context("failed to write per-query output")?;
            }
        }
    }
    for line in evaluator.final_lines() {
        writeln!(out, "{line}").context("failed to write final output")?;
    }
    out.flush().context("failed to flush output")?;

    if let Some(report_path) = &args.report_json {
        let report = build_report(
            &evaluator,
            &outcomes,
            &run,
            ReportInput {
                path: qrels_source,
                sha256: sha256_bytes(&qrels_bytes),
            },
            ReportInput {
                path: run_source,
                sha256: sha256_bytes(&run_bytes),
            },
            args.complete,
        );
        write_json_pretty(report_path, &report)?;
        info!(path = %report_path.display(), "wrote evaluation report");
    }

    Ok(())
}

fn resolve_selections(raw: &[String]) -> Result<Vec<MeasureSelection>> {
    if raw.is_empty() {
        return Ok(MeasureSelection::all());
    }

    let mut selections = Vec::new();
    for value in raw {
        let parsed = parse_selection(value)
            .with_context(|| format!("invalid measure selection {value:?}"))?;
        selections.extend(parsed);
    }
    Ok(selections)
}

/// Evaluates every run query in id order; with `complete`, judged queries
/// missing from the run are evaluated against an empty ranking.
pub fn evaluate_queries(
    evaluator: &mut Evaluator,
    judgments: &JudgmentSet,
    run: &RunSet,
    complete: bool,
) -> Vec<QueryOutcome> {
    let mut query_ids = run.queries.keys().cloned().collect::<BTreeSet<String>>();
    if complete {
        query_ids.extend(judgments.queries.keys().cloned());
    }

    query_ids
        .into_iter()
        .map(|query_id| {
            let fallback_results = RankedResults {
                query_id: query_id.clone(),
                doc_ids: Vec::new(),
            };
            let fallback_judgments = QueryJudgments::new(query_id.clone());
            let results = run.queries.get(&query_id).unwrap_or(&fallback_results);
            let query_judgments = judgments
                .queries
                .get(&query_id)
                .unwrap_or(&fallback_judgments);
            evaluator.evaluate_query(query_judgments, results)
        })
        .collect()
}

fn build_report(
    evaluator: &Evaluator,
    outcomes: &[QueryOutcome],
    run: &RunSet,
    qrels: ReportInput,
    run_input: ReportInput,
    complete: bool,
) -> EvaluationReport {
    let params = evaluator.params();
    let measures = evaluator
        .slots()
        .map(|slots| ReportMeasure {
            name: slots.measure.to_string(),
            params: slots.params.values().to_vec(),
            slots: slots.names.clone(),
        })
        .collect::<Vec<ReportMeasure>>();

    let per_query = outcomes
        .iter()
        .map(|outcome| {
            let mut values = BTreeMap::new();
            for slots in evaluator.slots() {
                for (name, value) in slots.names.iter().zip(outcome.eval.slot_values(slots)) {
                    values.insert(name.clone(), *value);
                }
            }
            ReportQueryRow {
                query_id: outcome.eval.query_id.clone(),
                values,
                failures: outcome
                    .failures
                    .iter()
                    .map(|failure| failure.to_string())
                    .collect(),
            }
        })
        .collect();

    let finals = evaluator
        .finals()
        .into_iter()
        .map(|value| ReportFinalRow {
            name: value.name,
            value: value.value,
            num_queries: value.num_queries,
        })
        .collect();

    EvaluationReport {
        manifest_version: REPORT_MANIFEST_VERSION,
        generated_at: now_utc_string(),
        run_id: run.run_id.clone(),
        qrels,
        run: run_input,
        parameters: ReportParameters {
            relevance_level: params.relevance_level,
            unjudged_policy: params.unjudged.as_str().to_string(),
            complete,
            max_docs_per_query: params.max_docs_per_query,
        },
        measures,
        per_query,
        finals,
    }
}

#[cfg(test)]
mod tests;
