//! Batch prediction over survey response files
//!
//! Runs the full pipeline per row: encode → forward pass → argmax → city
//! name. Output order matches input row order, one prediction per row.

use anyhow::{Result, anyhow};
use burn::tensor::backend::Backend;
use polars::prelude::DataFrame;

use crate::data;
use crate::encode;
use crate::labels;
use crate::model::{NUM_CLASSES, SurveyClassifier};

/// Index of the maximum score; ties resolve to the smallest index.
pub fn argmax_lowest(scores: &[f32]) -> usize {
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = i;
        }
    }
    best
}

/// Predicts a destination city for every row of a raw survey DataFrame.
///
/// # Arguments
/// * `df` - Raw survey rows (string cells, columns per `active`)
/// * `model` - Trained classifier
/// * `active` - Active-question configuration; must match the one the
///   model was trained with, otherwise the encoded width check fails
///
/// # Returns
/// * `Ok(Vec<String>)` - One city name per input row, in input order
/// * `Err` - On schema or feature-width mismatch
pub fn predict_batch<B: Backend>(
    df: &DataFrame,
    model: &SurveyClassifier<B>,
    active: &[&str],
) -> Result<Vec<String>> {
    let features = encode::encode_for_prediction(df, active)?;
    model.check_input_width(features.width())?;

    let x = data::df_to_tensor::<B>(features)?;
    let output = model.forward(x);

    let flat: Vec<f32> = output
        .into_data()
        .to_vec()
        .map_err(|e| anyhow!("classifier output conversion failed: {e:?}"))?;

    let cities = flat
        .chunks(NUM_CLASSES)
        .map(|scores| labels::decode_label(argmax_lowest(scores) as i64).to_string())
        .collect();

    Ok(cities)
}

/// Predicts a destination city for every row of a survey CSV file.
pub fn predict_all<B: Backend>(
    path: &str,
    model: &SurveyClassifier<B>,
    active: &[&str],
) -> Result<Vec<String>> {
    let df = data::load_csv(path)?;
    predict_batch(&df, model, active)
}
