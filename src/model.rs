//! Neural network model for destination classification
//!
//! This module provides a feed-forward classifier with a single hidden
//! layer, mapping an encoded survey feature vector to logits over the four
//! destination cities.

use anyhow::{Result, ensure};
use burn::{
    module::{Module, Param},
    nn::{Linear, LinearConfig, Relu},
    tensor::{Float, Tensor, backend::Backend},
};

/// Number of destination cities.
pub const NUM_CLASSES: usize = 4;

/// Hidden layer width.
pub const HIDDEN_SIZE: usize = 208;

/// Feature width of the default active-question configuration.
pub const NUM_FEATURES: usize = 71;

/// Destination classifier
///
/// Architecture: `num_features` → 208 (ReLU) → 4
///
/// The model consists of:
/// - Input layer: one unit per encoded survey feature
/// - Hidden layer: 208 neurons with ReLU activation
/// - Output layer: 4 neurons (logits for the four cities)
#[derive(Module, Debug)]
pub struct SurveyClassifier<B: Backend> {
    input_layer: Linear<B>,
    output_layer: Linear<B>,
    activation: Relu,
}

impl<B: Backend> SurveyClassifier<B> {
    /// Creates a classifier with randomly initialized weights.
    ///
    /// # Arguments
    /// * `device` - The device to initialize the model on
    /// * `num_features` - Width of the encoded feature vector
    pub fn new(device: &B::Device, num_features: usize) -> Self {
        let input_layer = LinearConfig::new(num_features, HIDDEN_SIZE).init(device);
        let output_layer = LinearConfig::new(HIDDEN_SIZE, NUM_CLASSES).init(device);

        Self {
            input_layer,
            output_layer,
            activation: Relu::new(),
        }
    }

    /// Builds a classifier from externally supplied parameters.
    ///
    /// Expected shapes: `w1` is `[hidden, num_features]`, `b1` is `[hidden]`,
    /// `w2` is `[4, hidden]`, `b2` is `[4]`. Weight matrices follow the
    /// `y = W·x + b` convention and are transposed into burn's `Linear`
    /// layout internally.
    ///
    /// # Errors
    /// Returns an error when the four shapes are mutually inconsistent or
    /// the output width is not exactly 4.
    pub fn from_parameters(
        w1: Tensor<B, 2>,
        b1: Tensor<B, 1>,
        w2: Tensor<B, 2>,
        b2: Tensor<B, 1>,
    ) -> Result<Self> {
        let [hidden, _num_features] = w1.dims();
        ensure!(
            b1.dims() == [hidden],
            "hidden bias shape {:?} does not match weight shape {:?}",
            b1.dims(),
            w1.dims()
        );
        ensure!(
            w2.dims() == [NUM_CLASSES, hidden],
            "output weight shape {:?}, expected [{NUM_CLASSES}, {hidden}]",
            w2.dims()
        );
        ensure!(
            b2.dims() == [NUM_CLASSES],
            "output bias shape {:?}, expected [{NUM_CLASSES}]",
            b2.dims()
        );

        Ok(Self {
            input_layer: Linear {
                weight: Param::from_tensor(w1.transpose()),
                bias: Some(Param::from_tensor(b1)),
            },
            output_layer: Linear {
                weight: Param::from_tensor(w2.transpose()),
                bias: Some(Param::from_tensor(b2)),
            },
            activation: Relu::new(),
        })
    }

    /// Exports the parameters in the `y = W·x + b` convention accepted by
    /// [`SurveyClassifier::from_parameters`].
    pub fn parameters(&self) -> (Tensor<B, 2>, Tensor<B, 1>, Tensor<B, 2>, Tensor<B, 1>) {
        let w1 = self.input_layer.weight.val().transpose();
        let w2 = self.output_layer.weight.val().transpose();
        let device = w1.device();

        let b1 = match &self.input_layer.bias {
            Some(bias) => bias.val(),
            None => Tensor::zeros([w1.dims()[0]], &device),
        };
        let b2 = match &self.output_layer.bias {
            Some(bias) => bias.val(),
            None => Tensor::zeros([NUM_CLASSES], &device),
        };

        (w1, b1, w2, b2)
    }

    /// Feature width this classifier was built for.
    pub fn num_features(&self) -> usize {
        self.input_layer.weight.val().dims()[0]
    }

    /// Rejects feature tables whose width differs from the training-time
    /// configuration. Width mismatches are fatal, never silently padded or
    /// truncated.
    pub fn check_input_width(&self, width: usize) -> Result<()> {
        ensure!(
            width == self.num_features(),
            "encoded feature width {width} does not match the {} features the classifier expects",
            self.num_features()
        );
        Ok(())
    }

    /// Performs a forward pass through the network.
    ///
    /// # Arguments
    /// * `input` - Input tensor of shape `[batch_size, num_features]`
    ///
    /// # Returns
    /// * Output logits of shape `[batch_size, 4]`
    pub fn forward(&self, input: Tensor<B, 2, Float>) -> Tensor<B, 2, Float> {
        let x = self.input_layer.forward(input);
        let x = self.activation.forward(x);
        self.output_layer.forward(x)
    }
}
