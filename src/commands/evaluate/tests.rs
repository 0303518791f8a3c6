use super::{build_report, evaluate_queries, resolve_selections};
use gradeval::measures::{EvalParams, Evaluator, MeasureSelection};
use gradeval::model::ReportInput;
use gradeval::trec_format::{parse_qrels, parse_run};

const QRELS: &[u8] = b"q1 0 d1 2\nq1 0 d2 1\nq1 0 d3 0\nq3 0 x 1\n";
const RUN: &[u8] = b"q1 Q0 d2 1 3.0 sys\nq1 Q0 d1 2 2.0 sys\nq1 Q0 d3 3 1.0 sys\nq2 Q0 d1 1 1.0 sys\n";

fn approx_eq(left: f64, right: f64) -> bool {
    (left - right).abs() < 1e-9
}

fn input(path: &str) -> ReportInput {
    ReportInput {
        path: path.to_string(),
        sha256: "0".repeat(64),
    }
}

#[test]
fn unjudged_run_query_is_undef_and_excluded_from_average() {
    let judgments = parse_qrels(QRELS, "qrels").expect("qrels should parse");
    let run = parse_run(RUN, "run").expect("run should parse");
    let selections = resolve_selections(&["err_rel_lvl".to_string()])
        .expect("selection should resolve");
    let mut evaluator =
        Evaluator::new(EvalParams::default(), selections).expect("evaluator should build");

    let outcomes = evaluate_queries(&mut evaluator, &judgments, &run, false);
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].eval.query_id, "q1");
    assert!(approx_eq(outcomes[0].eval.values[0].expect("q1 scored"), 0.53125));
    assert_eq!(outcomes[1].eval.query_id, "q2");
    assert_eq!(outcomes[1].eval.values[0], None);
    assert_eq!(outcomes[1].failures.len(), 1);

    let finals = evaluator.finals();
    assert_eq!(finals.len(), 1);
    assert_eq!(finals[0].num_queries, 1);
    assert!(approx_eq(finals[0].value, 0.53125));

    let lines = evaluator.single_lines(&outcomes[1]);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("\tq2\tundef"), "unexpected line: {}", lines[0]);
}

#[test]
fn complete_mode_scores_judged_queries_missing_from_run() {
    let judgments = parse_qrels(QRELS, "qrels").expect("qrels should parse");
    let run = parse_run(RUN, "run").expect("run should parse");
    let mut evaluator = Evaluator::new(EvalParams::default(), MeasureSelection::all())
        .expect("evaluator should build");

    let outcomes = evaluate_queries(&mut evaluator, &judgments, &run, true);
    let ids = outcomes
        .iter()
        .map(|outcome| outcome.eval.query_id.as_str())
        .collect::<Vec<&str>>();
    assert_eq!(ids, vec!["q1", "q2", "q3"]);

    let q3 = &outcomes[2];
    assert!(q3.failures.is_empty());
    assert!(q3.eval.values.iter().all(|value| *value == Some(0.0)));

    let finals = evaluator.finals();
    assert!(finals.iter().all(|value| value.num_queries == 2));
    let err = finals
        .iter()
        .find(|value| value.name == "err_rel_lvl")
        .expect("err final present");
    assert!(approx_eq(err.value, 0.53125 / 2.0));
}

#[test]
fn report_carries_null_for_unevaluated_slots() {
    let judgments = parse_qrels(QRELS, "qrels").expect("qrels should parse");
    let run = parse_run(RUN, "run").expect("run should parse");
    let selections = resolve_selections(&["qm_rel_lvl_cut.1,2".to_string()])
        .expect("selection should resolve");
    let mut evaluator =
        Evaluator::new(EvalParams::default(), selections).expect("evaluator should build");
    let outcomes = evaluate_queries(&mut evaluator, &judgments, &run, false);

    let report = build_report(
        &evaluator,
        &outcomes,
        &run,
        input("qrels"),
        input("run"),
        false,
    );
    assert_eq!(report.run_id.as_deref(), Some("sys"));
    assert_eq!(report.measures.len(), 1);
    assert_eq!(
        report.measures[0].slots,
        vec!["qm_rel_lvl_cut_1", "qm_rel_lvl_cut_2", "qm_rel_lvl_cut_all"]
    );
    assert_eq!(report.measures[0].params, vec![1, 2]);

    let json = serde_json::to_value(&report).expect("report should serialize");
    assert!(json["per_query"][1]["values"]["qm_rel_lvl_cut_all"].is_null());
    assert_eq!(report.finals.len(), 3);
    assert_eq!(report.parameters.unjudged_policy, "non_relevant");
}

#[test]
fn resolve_selections_defaults_to_every_measure() {
    let selections = resolve_selections(&[]).expect("empty selection should resolve");
    let names = selections
        .iter()
        .map(|selection| selection.measure.name())
        .collect::<Vec<&str>>();
    assert_eq!(names, vec!["err_rel_lvl", "qm_rel_lvl_cut"]);

    let error = resolve_selections(&["ndcg".to_string()]).expect_err("unknown measure");
    assert!(error.to_string().contains("ndcg"), "unexpected error: {error}");
}
