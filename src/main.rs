mod data;
mod encode;
mod labels;
mod model;
mod predict;
mod training;

use anyhow::Result;
use burn::{
    backend::{Autodiff, NdArray, ndarray::NdArrayDevice},
    module::{AutodiffModule, Module},
};

// Hyperparameters
const SEED: u64 = 42;
const TRAIN_RATIO: f64 = 0.7;
const LEARNING_RATE: f64 = 0.001;
const WEIGHT_DECAY: f64 = 0.0001;
const EPOCHS: usize = 2000;
const REPORT_INTERVAL: usize = 200;

const TRAIN_DATA_PATH: &str = "./data/survey_responses.csv";

fn main() -> Result<()> {
    println!("-----------------------");
    println!("data.rs + encode.rs:");
    println!("-----------------------");

    let raw_df = data::load_csv(TRAIN_DATA_PATH)?;
    println!(
        "Loaded {} responses with {} columns",
        raw_df.height(),
        raw_df.width()
    );

    let encoded_df = encode::encode_for_training(&raw_df, &encode::DEFAULT_ACTIVE)?;
    let encoded_df = data::shuffle_data(encoded_df, Some(SEED))?;

    let (features, label_codes) = data::split_xy(encoded_df)?;

    let features_tensor = data::df_to_tensor::<NdArray>(features)?;
    let labels_tensor = data::series_to_tensor::<NdArray>(label_codes)?;

    println!("Features tensor shape: {:?}", features_tensor.shape());
    println!("Labels tensor shape: {:?}", labels_tensor.shape());

    let (x_train, y_train, x_test, y_test) =
        data::train_test_split(features_tensor, labels_tensor, TRAIN_RATIO);

    println!(
        "x_train shape: {:?}, y_train shape: {:?}",
        x_train.shape(),
        y_train.shape()
    );
    println!(
        "x_test shape: {:?}, y_test shape: {:?}",
        x_test.shape(),
        y_test.shape()
    );

    println!();
    println!("-----------------------");
    println!("model.rs:");
    println!("-----------------------");

    let device = NdArrayDevice::Cpu;
    let num_features = x_train.dims()[1];
    let model = model::SurveyClassifier::<Autodiff<NdArray>>::new(&device, num_features);

    println!("Total parameters: {}", model.num_params());

    println!();
    println!("-----------------------");
    println!("training.rs:");
    println!("-----------------------");

    let initial_validation_model = (&model).valid();

    let initial_train_output = initial_validation_model.forward(x_train.clone());
    let initial_test_output = initial_validation_model.forward(x_test.clone());

    let initial_train_accuracy =
        training::calculate_accuracy(initial_train_output, y_train.clone());
    let initial_test_accuracy = training::calculate_accuracy(initial_test_output, y_test.clone());

    println!(
        "Model accuracy using train dataset before training: {}",
        initial_train_accuracy
    );
    println!(
        "Model accuracy using test dataset before training: {}",
        initial_test_accuracy
    );
    println!();
    println!("----------- Training reports -----------");

    let (trained_model, train_losses, test_losses) = training::train(
        model,
        x_train.clone(),
        y_train.clone(),
        x_test.clone(),
        y_test.clone(),
        WEIGHT_DECAY,
        EPOCHS,
        REPORT_INTERVAL,
        LEARNING_RATE,
    );

    println!();
    println!("Final train loss: {:.4}", train_losses.last().unwrap());
    println!("Final test loss: {:.4}", test_losses.last().unwrap());

    let final_validation_model = (&trained_model).valid();

    let final_train_output = final_validation_model.forward(x_train);
    let final_test_output = final_validation_model.forward(x_test);

    let final_train_accuracy = training::calculate_accuracy(final_train_output, y_train);
    let final_test_accuracy = training::calculate_accuracy(final_test_output, y_test);

    println!(
        "Model accuracy using train dataset after training: {:.4}",
        final_train_accuracy
    );
    println!(
        "Model accuracy using test dataset after training: {:.4}",
        final_test_accuracy
    );

    println!();
    println!("-----------------------");
    println!("predict.rs:");
    println!("-----------------------");

    // Round-trip the trained parameters through the external weight
    // interface, then run batch prediction with the rebuilt model.
    let (w1, b1, w2, b2) = final_validation_model.parameters();
    let inference_model = model::SurveyClassifier::<NdArray>::from_parameters(w1, b1, w2, b2)?;

    let cities = predict::predict_all(TRAIN_DATA_PATH, &inference_model, &encode::DEFAULT_ACTIVE)?;
    println!("Predicted {} destinations", cities.len());
    println!(
        "First predictions: {:?}",
        &cities[..cities.len().min(5)]
    );

    Ok(())
}
