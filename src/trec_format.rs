use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::hash_map::Entry;

use anyhow::{Context, Result, bail};

use crate::model::{JudgmentSet, QueryJudgments, RankedResults, RunSet};

/// Parses `query_id iteration doc_id level` lines.
pub fn parse_qrels(data: &[u8], source: &str) -> Result<JudgmentSet> {
    let text =
        std::str::from_utf8(data).with_context(|| format!("qrels are not UTF-8: {source}"))?;

    let mut set = JudgmentSet::default();
    for (line_index, line) in text.lines().enumerate() {
        let line_no = line_index + 1;
        let fields = line.split_whitespace().collect::<Vec<&str>>();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != 4 {
            bail!(
                "{source}:{line_no}: expected 4 qrels fields, found {}",
                fields.len()
            );
        }

        let query_id = fields[0];
        let doc_id = fields[2];
        let level = fields[3]
            .parse::<i32>()
            .with_context(|| format!("{source}:{line_no}: invalid relevance level {:?}", fields[3]))?;

        let judgments = set
            .queries
            .entry(query_id.to_string())
            .or_insert_with(|| QueryJudgments::new(query_id));
        match judgments.levels.entry(doc_id.to_string()) {
            Entry::Occupied(_) => {
                bail!("{source}:{line_no}: duplicate judgment for {query_id}/{doc_id}")
            }
            Entry::Vacant(slot) => {
                slot.insert(level);
            }
        }
        set.judgment_count += 1;
    }

    Ok(set)
}

struct ScoredDoc {
    doc_id: String,
    score: f64,
}

/// Parses `query_id iteration doc_id rank score run_id` lines. Documents are
/// ordered by descending score, ties by descending doc id; the rank column
/// is ignored.
pub fn parse_run(data: &[u8], source: &str) -> Result<RunSet> {
    let text = std::str::from_utf8(data).with_context(|| format!("run is not UTF-8: {source}"))?;

    let mut run_id: Option<String> = None;
    let mut scored = BTreeMap::<String, Vec<ScoredDoc>>::new();
    let mut line_count = 0_usize;
    for (line_index, line) in text.lines().enumerate() {
        let line_no = line_index + 1;
        let fields = line.split_whitespace().collect::<Vec<&str>>();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != 6 {
            bail!(
                "{source}:{line_no}: expected 6 run fields, found {}",
                fields.len()
            );
        }

        let score = fields[4]
            .parse::<f64>()
            .with_context(|| format!("{source}:{line_no}: invalid score {:?}", fields[4]))?;
        if !score.is_finite() {
            bail!("{source}:{line_no}: score must be finite, found {}", fields[4]);
        }

        match run_id.as_deref() {
            Some(existing) if existing != fields[5] => {
                bail!(
                    "{source}:{line_no}: run id {:?} differs from {:?}",
                    fields[5],
                    existing
                );
            }
            Some(_) => {}
            None => run_id = Some(fields[5].to_string()),
        }

        scored
            .entry(fields[0].to_string())
            .or_default()
            .push(ScoredDoc {
                doc_id: fields[2].to_string(),
                score,
            });
        line_count += 1;
    }

    let queries = scored
        .into_iter()
        .map(|(query_id, mut docs)| {
            docs.sort_by(|left, right| {
                right
                    .score
                    .partial_cmp(&left.score)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| right.doc_id.cmp(&left.doc_id))
            });
            let results = RankedResults {
                query_id: query_id.clone(),
                doc_ids: docs.into_iter().map(|doc| doc.doc_id).collect(),
            };
            (query_id, results)
        })
        .collect();

    Ok(RunSet {
        run_id,
        queries,
        line_count,
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_qrels, parse_run};

    #[test]
    fn qrels_group_by_query_and_keep_negative_levels() {
        let raw = b"q1 0 d1 2\nq1 0 d2 0\n\nq2 0 d9 -1\n";
        let set = parse_qrels(raw, "qrels").expect("qrels should parse");

        assert_eq!(set.judgment_count, 3);
        assert_eq!(set.queries.len(), 2);
        let q1 = &set.queries["q1"];
        assert_eq!(q1.judged_level("d1"), Some(2));
        assert_eq!(q1.judged_level("d2"), Some(0));
        let q2 = &set.queries["q2"];
        assert_eq!(q2.levels.get("d9"), Some(&-1));
        assert_eq!(q2.judged_level("d9"), None);
    }

    #[test]
    fn qrels_reject_malformed_and_duplicate_lines() {
        let error = parse_qrels(b"q1 0 d1\n", "qrels").expect_err("short line should fail");
        assert!(error.to_string().contains("qrels:1"), "unexpected error: {error}");

        let error = parse_qrels(b"q1 0 d1 x\n", "qrels").expect_err("bad level should fail");
        assert!(error.to_string().contains("qrels:1"), "unexpected error: {error}");

        let error = parse_qrels(b"q1 0 d1 1\nq1 0 d1 2\n", "qrels")
            .expect_err("duplicate judgment should fail");
        assert!(error.to_string().contains("qrels:2"), "unexpected error: {error}");
    }

    #[test]
    fn run_orders_by_score_then_doc_id_descending() {
        let raw = b"q1 Q0 a 1 0.5 sys\nq1 Q0 b 2 0.9 sys\nq1 Q0 c 3 0.5 sys\nq0 Q0 z 1 1.0 sys\n";
        let run = parse_run(raw, "run").expect("run should parse");

        assert_eq!(run.run_id.as_deref(), Some("sys"));
        assert_eq!(run.line_count, 4);
        assert_eq!(run.queries.keys().collect::<Vec<_>>(), vec!["q0", "q1"]);
        assert_eq!(run.queries["q1"].doc_ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn run_treats_signed_zero_scores_as_tied() {
        let run = parse_run(b"q1 Q0 a 1 0 sys\nq1 Q0 b 2 -0 sys\nq1 Q0 c 3 -0.0 sys\n", "run")
            .expect("run should parse");
        assert_eq!(run.queries["q1"].doc_ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn run_rejects_mixed_run_ids_and_bad_scores() {
        let error = parse_run(b"q1 Q0 a 1 0.5 one\nq1 Q0 b 2 0.4 two\n", "run")
            .expect_err("mixed run ids should fail");
        assert!(error.to_string().contains("run:2"), "unexpected error: {error}");

        assert!(parse_run(b"q1 Q0 a 1 high sys\n", "run").is_err());
        assert!(parse_run(b"q1 Q0 a 1 NaN sys\n", "run").is_err());
        assert!(parse_run(b"q1 Q0 a 1\n", "run").is_err());
    }

    #[test]
    fn run_keeps_duplicate_documents_for_later_validation() {
        let run = parse_run(b"q1 Q0 a 1 0.5 sys\nq1 Q0 a 2 0.4 sys\n", "run")
            .expect("duplicates are not a parse error");
        assert_eq!(run.queries["q1"].doc_ids, vec!["a", "a"]);
    }
}
