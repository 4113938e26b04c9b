//! Feature encoding for the destination survey
//!
//! This module turns the raw questionnaire columns (`Q1`..`Q9`) into the
//! fixed-width numeric feature table consumed by the classifier. The same
//! functions run at training time and at prediction time, so the resulting
//! column set and order depend only on the active-question configuration,
//! never on the data rows seen.
//!
//! Question kinds:
//! - Q1-Q4: 1-5 scale answers embedded in free text, one-hot encoded
//! - Q5: multi-select companion checkboxes, one flag per known token
//! - Q6: ranked-choice area list, per-area rank one-hot encoded
//! - Q7-Q9: plain numeric answers

use anyhow::{Context, Result, ensure};
use polars::prelude::*;
use regex::Regex;
use std::sync::LazyLock;

use crate::labels::encode_label;

/// The full question schema, in encoding order.
pub const ALL_QUESTIONS: [&str; 9] = [
    "Q1", "Q2", "Q3", "Q4", "Q5", "Q6", "Q7", "Q8", "Q9",
];

/// Active-question subset the shipped model was trained with (71 features).
pub const DEFAULT_ACTIVE: [&str; 7] = ["Q1", "Q2", "Q3", "Q4", "Q5", "Q6", "Q7"];

/// Admissible values for the 1-5 scale questions (Q1-Q4).
const SCALE_LEVELS: [i64; 6] = [-1, 1, 2, 3, 4, 5];

/// Admissible per-area rank values for the ranked-choice question (Q6).
const RANK_LEVELS: [i64; 7] = [-1, 1, 2, 3, 4, 5, 6];

/// Checkbox tokens for the multi-select question (Q5), in column order.
const COMPANION_TOKENS: [&str; 4] = ["Partner", "Friends", "Siblings", "Co-worker"];

/// Number of rank slots in a parsed Q6 answer.
const RANK_SLOTS: usize = 6;

static DIGIT_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit-run pattern"));

// ---------------------------------------------------------------------------
// Scalar parsers
// ---------------------------------------------------------------------------

/// Parses a cell as a float, stripping thousands separators.
///
/// Missing, empty, or non-numeric cells yield `f64::NAN`; parse failures are
/// never fatal.
pub fn to_numeric(cell: Option<&str>) -> f64 {
    match cell {
        Some(s) => s.replace(',', "").trim().parse::<f64>().unwrap_or(f64::NAN),
        None => f64::NAN,
    }
}

/// Extracts every maximal run of decimal digits in `cell`, left to right.
pub fn extract_numbers(cell: &str) -> Vec<i64> {
    DIGIT_RUNS
        .find_iter(cell)
        .filter_map(|m| m.as_str().parse::<i64>().ok())
        .collect()
}

/// First number embedded in the cell, or `-1` when there is none.
pub fn first_number(cell: Option<&str>) -> i64 {
    cell.map(extract_numbers)
        .and_then(|numbers| numbers.first().copied())
        .unwrap_or(-1)
}

/// Extracted numbers right-padded with `-1` to at least [`RANK_SLOTS`].
///
/// Padding only, never truncation: a cell with more than six numbers keeps
/// all of them, and out-of-range ranks later collapse to the sentinel slot
/// during one-hot encoding.
pub fn extract_numbers_fixed(cell: Option<&str>) -> Vec<i64> {
    let mut numbers = cell.map(extract_numbers).unwrap_or_default();
    while numbers.len() < RANK_SLOTS {
        numbers.push(-1);
    }
    numbers
}

/// 1-based position of `value` in `list`, or `-1` if absent.
pub fn rank_of(list: &[i64], value: i64) -> i64 {
    list.iter()
        .position(|&v| v == value)
        .map(|i| i as i64 + 1)
        .unwrap_or(-1)
}

/// Whether `token` occurs as a substring of the cell, as a binary integer.
///
/// A missing cell is `0` unconditionally, not "unknown".
pub fn contains_token(cell: Option<&str>, token: &str) -> i64 {
    cell.map(|s| s.contains(token) as i64).unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Category encoder
// ---------------------------------------------------------------------------

/// One-hot encodes `values` against a pre-declared level set.
///
/// Produces one `f64` indicator column per level, named `{prefix}_{level}`.
/// Values outside the level set land in the sentinel `-1` slot, so every row
/// carries exactly one indicator.
fn one_hot_columns(prefix: &str, values: &[i64], levels: &[i64]) -> Vec<Column> {
    let snapped: Vec<i64> = values
        .iter()
        .map(|&v| if levels.contains(&v) { v } else { -1 })
        .collect();

    levels
        .iter()
        .map(|&level| {
            let indicators: Vec<f64> = snapped
                .iter()
                .map(|&v| if v == level { 1.0 } else { 0.0 })
                .collect();
            Column::new(format!("{prefix}_{level}").into(), indicators)
        })
        .collect()
}

fn str_cells<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    let column = df
        .column(name)
        .with_context(|| format!("input is missing required column {name}"))?;
    column
        .str()
        .with_context(|| format!("column {name} is not a string column"))
}

/// Scale questions (Q1-Q4): first embedded number, one-hot over `-1,1..=5`.
fn encode_scale(df: &DataFrame, question: &str) -> Result<Vec<Column>> {
    let values: Vec<i64> = str_cells(df, question)?.into_iter().map(first_number).collect();
    Ok(one_hot_columns(question, &values, &SCALE_LEVELS))
}

/// Multi-select question (Q5): one binary column per known companion token.
///
/// Column order follows [`COMPANION_TOKENS`], not the order tokens appear in
/// the cell.
fn encode_multi_select(df: &DataFrame) -> Result<Vec<Column>> {
    let cells = str_cells(df, "Q5")?;
    Ok(COMPANION_TOKENS
        .iter()
        .map(|token| {
            let flags: Vec<f64> = cells
                .into_iter()
                .map(|cell| contains_token(cell, token) as f64)
                .collect();
            Column::new(format!("Q5_{token}").into(), flags)
        })
        .collect())
}

/// Ranked-choice question (Q6): per-area rank, one-hot over `-1,1..=6`.
fn encode_ranked(df: &DataFrame) -> Result<Vec<Column>> {
    let rank_lists: Vec<Vec<i64>> = str_cells(df, "Q6")?
        .into_iter()
        .map(extract_numbers_fixed)
        .collect();

    let mut columns = Vec::with_capacity(RANK_SLOTS * RANK_LEVELS.len());
    for area in 1..=RANK_SLOTS as i64 {
        let ranks: Vec<i64> = rank_lists.iter().map(|list| rank_of(list, area)).collect();
        columns.extend(one_hot_columns(&format!("Q6_rank_{area}"), &ranks, &RANK_LEVELS));
    }
    Ok(columns)
}

/// Numeric questions (Q7-Q9): parsed as float, unparseable cells become `0`.
///
/// Numeric fields use `0` as their "no info" sentinel, not the categorical
/// `-1`.
fn encode_numeric(df: &DataFrame, question: &str) -> Result<Vec<Column>> {
    let values: Vec<f64> = str_cells(df, question)?
        .into_iter()
        .map(|cell| {
            let value = to_numeric(cell);
            if value.is_nan() { 0.0 } else { value }
        })
        .collect();
    Ok(vec![Column::new(question.into(), values)])
}

fn encode_question(df: &DataFrame, question: &str) -> Result<Vec<Column>> {
    match question {
        "Q1" | "Q2" | "Q3" | "Q4" => encode_scale(df, question),
        "Q5" => encode_multi_select(df),
        "Q6" => encode_ranked(df),
        "Q7" | "Q8" | "Q9" => encode_numeric(df, question),
        other => anyhow::bail!("unknown question key {other}"),
    }
}

// ---------------------------------------------------------------------------
// Feature assembler
// ---------------------------------------------------------------------------

fn feature_columns(df: &DataFrame, active: &[&str]) -> Result<Vec<Column>> {
    for question in active {
        ensure!(
            ALL_QUESTIONS.contains(question),
            "unknown question key {question} in active configuration"
        );
    }

    let mut columns = Vec::new();
    for question in ALL_QUESTIONS {
        if active.contains(&question) {
            columns.extend(encode_question(df, question)?);
        }
    }
    Ok(columns)
}

/// Encodes raw survey rows into the training feature table.
///
/// Iterates the fixed question order, skipping inactive questions, and
/// appends the integer `Label` column last.
pub fn encode_for_training(df: &DataFrame, active: &[&str]) -> Result<DataFrame> {
    let mut columns = feature_columns(df, active)?;

    let labels: Vec<i64> = str_cells(df, "Label")?
        .into_iter()
        .map(|cell| encode_label(cell.unwrap_or("")))
        .collect();
    columns.push(Column::new("Label".into(), labels));

    DataFrame::new(columns).map_err(Into::into)
}

/// Encodes raw survey rows into the prediction feature table.
///
/// Produces the same non-label columns as [`encode_for_training`], in the
/// same order, without `Label`.
pub fn encode_for_prediction(df: &DataFrame, active: &[&str]) -> Result<DataFrame> {
    DataFrame::new(feature_columns(df, active)?).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_numeric_strips_thousands_separators() {
        assert_eq!(to_numeric(Some("1,250")), 1250.0);
        assert_eq!(to_numeric(Some(" 42.5 ")), 42.5);
    }

    #[test]
    fn to_numeric_degrades_to_nan() {
        assert!(to_numeric(Some("no idea")).is_nan());
        assert!(to_numeric(Some("")).is_nan());
        assert!(to_numeric(None).is_nan());
    }

    #[test]
    fn extract_numbers_finds_maximal_digit_runs() {
        assert_eq!(extract_numbers("I rate it 4 out of 5"), vec![4, 5]);
        assert_eq!(extract_numbers("1. Dubai 2. Paris"), vec![1, 2]);
        assert_eq!(extract_numbers("no digits here"), Vec::<i64>::new());
    }

    #[test]
    fn first_number_falls_back_to_sentinel() {
        assert_eq!(first_number(Some("I rate it 4 out of 5")), 4);
        assert_eq!(first_number(Some("none")), -1);
        assert_eq!(first_number(None), -1);
    }

    #[test]
    fn extract_numbers_fixed_pads_to_six() {
        let list = extract_numbers_fixed(Some("1. Dubai 2. Paris"));
        assert_eq!(list.len(), RANK_SLOTS);
        assert_eq!(list, vec![1, 2, -1, -1, -1, -1]);

        assert_eq!(extract_numbers_fixed(None), vec![-1; 6]);
    }

    #[test]
    fn extract_numbers_fixed_prefix_matches_extract_numbers() {
        let cell = "3 then 1 then 2";
        let fixed = extract_numbers_fixed(Some(cell));
        let plain = extract_numbers(cell);
        assert_eq!(&fixed[..plain.len()], plain.as_slice());
        assert!(fixed[plain.len()..].iter().all(|&v| v == -1));
    }

    #[test]
    fn extract_numbers_fixed_never_truncates() {
        let list = extract_numbers_fixed(Some("1 2 3 4 5 6 7 8"));
        assert_eq!(list, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn rank_of_is_one_based_with_absence_sentinel() {
        let list = [1, 2, -1, -1, -1, -1];
        assert_eq!(rank_of(&list, 1), 1);
        assert_eq!(rank_of(&list, 2), 2);
        assert_eq!(rank_of(&list, 3), -1);
    }

    #[test]
    fn contains_token_treats_missing_as_absent() {
        assert_eq!(contains_token(Some("Partner, Friends"), "Partner"), 1);
        assert_eq!(contains_token(Some("Partner, Friends"), "Siblings"), 0);
        assert_eq!(contains_token(None, "Partner"), 0);
    }

    #[test]
    fn scale_question_one_hot() {
        let df = df!("Q1" => &["I rate it 4 out of 5"]).unwrap();
        let encoded = encode_for_prediction(&df, &["Q1"]).unwrap();

        let names: Vec<&str> = encoded.get_column_names_str();
        assert_eq!(names, vec!["Q1_-1", "Q1_1", "Q1_2", "Q1_3", "Q1_4", "Q1_5"]);

        let row: Vec<f64> = names
            .iter()
            .map(|&name| encoded.column(name).unwrap().f64().unwrap().get(0).unwrap())
            .collect();
        assert_eq!(row, vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn scale_question_out_of_range_value_hits_sentinel_slot() {
        let df = df!("Q2" => &["easily an 8"]).unwrap();
        let encoded = encode_for_prediction(&df, &["Q2"]).unwrap();
        assert_eq!(
            encoded.column("Q2_-1").unwrap().f64().unwrap().get(0),
            Some(1.0)
        );
    }

    #[test]
    fn multi_select_flags_follow_token_order() {
        let df = df!("Q5" => &["Partner, Friends"]).unwrap();
        let encoded = encode_for_prediction(&df, &["Q5"]).unwrap();

        assert_eq!(
            encoded.get_column_names_str(),
            vec!["Q5_Partner", "Q5_Friends", "Q5_Siblings", "Q5_Co-worker"]
        );
        let row: Vec<f64> = encoded
            .get_column_names_str()
            .iter()
            .map(|&name| encoded.column(name).unwrap().f64().unwrap().get(0).unwrap())
            .collect();
        assert_eq!(row, vec![1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn ranked_question_encodes_per_area_ranks() {
        let df = df!("Q6" => &["1. Dubai 2. Paris"]).unwrap();
        let encoded = encode_for_prediction(&df, &["Q6"]).unwrap();

        // 6 areas x 7 levels
        assert_eq!(encoded.width(), 42);
        // area 1 at rank 1, area 2 at rank 2, area 3 absent
        assert_eq!(
            encoded.column("Q6_rank_1_1").unwrap().f64().unwrap().get(0),
            Some(1.0)
        );
        assert_eq!(
            encoded.column("Q6_rank_2_2").unwrap().f64().unwrap().get(0),
            Some(1.0)
        );
        assert_eq!(
            encoded.column("Q6_rank_3_-1").unwrap().f64().unwrap().get(0),
            Some(1.0)
        );
    }

    #[test]
    fn numeric_question_uses_zero_sentinel() {
        let df = df!("Q7" => &[Some("25"), Some("not sure"), None]).unwrap();
        let encoded = encode_for_prediction(&df, &["Q7"]).unwrap();

        let q7 = encoded.column("Q7").unwrap().f64().unwrap();
        assert_eq!(q7.get(0), Some(25.0));
        assert_eq!(q7.get(1), Some(0.0));
        assert_eq!(q7.get(2), Some(0.0));
    }

    #[test]
    fn default_active_configuration_width() {
        let df = df!(
            "Q1" => &["5"], "Q2" => &["4"], "Q3" => &["3"], "Q4" => &["2"],
            "Q5" => &["Friends"], "Q6" => &["1 2 3 4 5 6"], "Q7" => &["20"],
        )
        .unwrap();
        let encoded = encode_for_prediction(&df, &DEFAULT_ACTIVE).unwrap();
        assert_eq!(encoded.width(), crate::model::NUM_FEATURES);
    }

    #[test]
    fn encoding_is_deterministic() {
        let df = df!(
            "Q1" => &["maybe a 3?"],
            "Q5" => &["Siblings"],
            "Q7" => &["1,200"],
        )
        .unwrap();
        let first = encode_for_prediction(&df, &["Q1", "Q5", "Q7"]).unwrap();
        let second = encode_for_prediction(&df, &["Q1", "Q5", "Q7"]).unwrap();
        assert!(first.equals(&second));
    }

    #[test]
    fn training_and_prediction_columns_agree() {
        let df = df!(
            "Q1" => &["4"],
            "Q5" => &["Partner"],
            "Q7" => &["30"],
            "Label" => &["Dubai"],
        )
        .unwrap();
        let active = ["Q1", "Q5", "Q7"];

        let train = encode_for_training(&df, &active).unwrap();
        let predict = encode_for_prediction(&df, &active).unwrap();

        let train_names = train.get_column_names_str();
        assert_eq!(train_names.last(), Some(&"Label"));
        assert_eq!(
            &train_names[..train_names.len() - 1],
            predict.get_column_names_str().as_slice()
        );
        assert!(train.drop("Label").unwrap().equals(&predict));
    }

    #[test]
    fn training_encoding_appends_label_codes() {
        let df = df!(
            "Q7" => &["1", "2", "3"],
            "Label" => &["Dubai", "New York City", "Atlantis"],
        )
        .unwrap();
        let encoded = encode_for_training(&df, &["Q7"]).unwrap();
        let labels = encoded.column("Label").unwrap().i64().unwrap();
        assert_eq!(labels.get(0), Some(0));
        assert_eq!(labels.get(1), Some(2));
        assert_eq!(labels.get(2), Some(3));
    }

    #[test]
    fn missing_active_column_is_a_structural_error() {
        let df = df!("Q1" => &["4"]).unwrap();
        assert!(encode_for_prediction(&df, &["Q1", "Q5"]).is_err());
    }

    #[test]
    fn unknown_active_key_is_rejected() {
        let df = df!("Q1" => &["4"]).unwrap();
        assert!(encode_for_prediction(&df, &["Q10"]).is_err());
    }
}
