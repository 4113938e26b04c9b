//! Data handling utilities for the survey classifier
//!
//! This module provides functions for loading the raw survey CSV,
//! shuffling, splitting features from labels, and converting encoded
//! tables into Burn tensors for training and prediction.

use anyhow::{Context, Result};
use burn::tensor::{Float, Int, Tensor, backend::Backend};
use polars::prelude::*;
use std::fs;

/// Loads a survey response CSV into a DataFrame
///
/// Every column is read as a string: cells are loosely-typed free text and
/// all numeric interpretation happens in the encoding pipeline, never at
/// load time.
///
/// # Arguments
/// * `path` - Path to a CSV with a header row (`Q1`..`Q9`, optionally `Label`)
///
/// # Returns
/// * `Ok(DataFrame)` - The raw survey rows
/// * `Err` - If the file cannot be opened or parsed
pub fn load_csv(path: &str) -> Result<DataFrame> {
    let file = fs::File::open(path).with_context(|| format!("opening survey file {path}"))?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()
        .with_context(|| format!("reading survey file {path}"))?;

    Ok(df)
}

/// Randomly shuffles the rows of a DataFrame
///
/// # Arguments
/// * `df` - The DataFrame to shuffle
/// * `seed` - Optional random seed for reproducibility
///
/// # Returns
/// * `Ok(DataFrame)` - Shuffled DataFrame with same shape
/// * `Err` - If shuffling fails
pub fn shuffle_data(df: DataFrame, seed: Option<u64>) -> Result<DataFrame> {
    let num_rows = df.height();
    let shuffled = df.sample_n_literal(num_rows, false, true, seed)?;

    Ok(shuffled)
}

/// Splits an encoded training table into features (x) and labels (y)
///
/// Separates the trailing `Label` column from the feature columns.
///
/// # Arguments
/// * `df` - Encoded training table (features plus `Label`)
///
/// # Returns
/// * `Ok((DataFrame, Series))` - Tuple of (features, labels)
/// * `Err` - If the `Label` column is missing
pub fn split_xy(df: DataFrame) -> Result<(DataFrame, Series)> {
    let y = df
        .column("Label")
        .context("encoded training table has no Label column")?
        .as_materialized_series()
        .clone();

    let x = df.drop("Label")?;

    Ok((x, y))
}

/// Converts a label Series into a 1D Burn tensor
///
/// Labels are already integer class codes in `0..=3` after encoding.
///
/// # Arguments
/// * `series` - Series containing class codes
///
/// # Returns
/// * `Ok(Tensor<B, 1>)` - 1D integer tensor of class indices
/// * `Err` - If the series is not an integer column
pub fn series_to_tensor<B: Backend>(series: Series) -> Result<Tensor<B, 1, Int>> {
    let values: Vec<i64> = series
        .i64()?
        .into_iter()
        .map(|v| v.unwrap_or(0))
        .collect();

    let tensor = Tensor::<B, 1, Int>::from_ints(values.as_slice(), &B::Device::default());

    Ok(tensor)
}

/// Converts an encoded feature DataFrame into a 2D Burn tensor
///
/// # Arguments
/// * `df` - Feature columns (indicator and numeric, all castable to f32)
///
/// # Returns
/// * `Ok(Tensor<B, 2>)` - 2D float tensor of shape [num_rows, num_features]
/// * `Err` - If a column cannot be cast to f32
pub fn df_to_tensor<B: Backend>(df: DataFrame) -> Result<Tensor<B, 2, Float>> {
    let num_rows = df.height();
    let num_cols = df.width();

    // Column-major flat buffer; transpose below restores row-major layout.
    let mut flat: Vec<f32> = Vec::with_capacity(num_rows * num_cols);
    for column in df.iter() {
        let series = column.cast(&DataType::Float32)?;
        for value in series.f32()? {
            flat.push(value.unwrap_or(0.0));
        }
    }

    let tensor = Tensor::<B, 1, Float>::from_floats(flat.as_slice(), &B::Device::default())
        .reshape([num_cols, num_rows])
        .transpose();

    Ok(tensor)
}

/// Splits tensors into training and test sets
///
/// Performs a simple train/test split based on the given ratio.
/// Note: Data should be shuffled before calling this function.
///
/// # Arguments
/// * `x` - 2D feature tensor of shape [num_samples, num_features]
/// * `y` - 1D label tensor of shape [num_samples]
/// * `train_ratio` - Proportion of data for training (e.g., 0.7 for 70%)
///
/// # Returns
/// Tuple of (x_train, y_train, x_test, y_test)
pub fn train_test_split<B: Backend>(
    x: Tensor<B, 2, Float>,
    y: Tensor<B, 1, Int>,
    train_ratio: f64,
) -> (
    Tensor<B, 2, Float>,
    Tensor<B, 1, Int>,
    Tensor<B, 2, Float>,
    Tensor<B, 1, Int>,
) {
    let total_samples = x.dims()[0];
    let train_size = (total_samples as f64 * train_ratio) as usize;
    let num_cols = x.dims()[1];

    // Split features into train and test
    let x_train = x.clone().slice([0..train_size, 0..num_cols]);
    let x_test = x.slice([train_size..total_samples, 0..num_cols]);

    // Split labels into train and test
    let y_train = y.clone().slice([0..train_size]);
    let y_test = y.slice([train_size..total_samples]);

    (x_train, y_train, x_test, y_test)
}
