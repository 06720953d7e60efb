use super::*;
use crate::model::calibration::ThresholdType;
use crate::pipeline::predict::{ModelKind, ScoreBundle};

#[test]
fn test_read_records_parses_jsonl_with_defaults() {
    let input = concat!(
        "{\"id\":\"r1\",\"title\":\"A trial\",\"abstract\":\"Text.\",",
        "\"ptyp\":[\"Randomized Controlled Trial\"],\"use_ptyp\":true}\n",
        "\n",
        "{\"id\":\"r2\",\"title\":\"No abstract here\"}\n",
    );
    let records = read_records(input.as_bytes()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "r1");
    assert_eq!(records[0].use_ptyp, Some(true));
    assert_eq!(records[0].ptyp, vec!["Randomized Controlled Trial"]);
    assert_eq!(records[1].abstract_text, "");
    assert_eq!(records[1].use_ptyp, None);
}

#[test]
fn test_read_records_reports_the_offending_line() {
    let input = "{\"id\":\"ok\"}\nnot json\n";
    let err = read_records(input.as_bytes()).unwrap_err();
    match err {
        ReportError::Parse { line, .. } => assert_eq!(line, 2),
        other => panic!("unexpected error: {other}"),
    }
}

fn fixture_prediction(id: &str, is_rct: bool) -> Prediction {
    Prediction {
        id: id.to_string(),
        model: ModelKind::SvmPtyp,
        score: 1.5,
        threshold_type: ThresholdType::Sensitive,
        threshold_value: 0.2,
        is_rct,
        ptyp_rct: 1,
        scores: ScoreBundle {
            ptyp: 1.0,
            svm: 0.5,
            svm_ptyp: 1.5,
        },
    }
}

#[test]
fn test_write_predictions_is_one_json_object_per_line() {
    let predictions = vec![fixture_prediction("r1", true), fixture_prediction("r2", false)];
    let mut out = Vec::new();
    write_predictions(&mut out, &predictions).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["id"], "r1");
    assert_eq!(first["model"], "svm_ptyp");
    assert_eq!(first["threshold_type"], "sensitive");
    assert_eq!(first["is_rct"], true);
    assert_eq!(first["ptyp_rct"], 1);
    assert_eq!(first["scores"]["svm_ptyp"], 1.5);

    let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["is_rct"], false);
}

#[test]
fn test_write_raw_scores_is_a_single_object() {
    let raw = RawScores {
        svm: vec![0.5, -1.25],
        ptyp: vec![-1, 1],
    };
    let mut out = Vec::new();
    write_raw_scores(&mut out, &raw).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 1);
    let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
    assert_eq!(value["svms"][1], -1.25);
    assert_eq!(value["ptyps"][0], -1);
}
