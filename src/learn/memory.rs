use anyhow::Result;
use tch::{Device, Tensor};

use crate::error::BotAiError;

#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub features: Vec<f32>,
    pub target: Vec<f32>,
}

#[derive(Clone, Debug, Default)]
pub struct SampleSet {
    samples: Vec<Sample>,
}

impl SampleSet {
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    pub fn put(&mut self, item: Sample) {
        self.samples.push(item);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn input_size(&self) -> Option<usize> {
        self.samples.first().map(|s| s.features.len())
    }

    pub fn output_size(&self) -> Option<usize> {
        self.samples.first().map(|s| s.target.len())
    }

    /// Row-major `[n, inputs]` and `[n, outputs]` tensors.
    pub fn to_tensors(&self, device: Device) -> Result<(Tensor, Tensor)> {
        let (channels, output_channels) = match (self.input_size(), self.output_size()) {
            (Some(i), Some(o)) => (i, o),
            _ => return Err(BotAiError::NoTrainingSamples.into()),
        };
        let batch_size = self.samples.len();

        let mut input = Vec::with_capacity(batch_size * channels);
        let mut output = Vec::with_capacity(batch_size * output_channels);
        for (row, sample) in self.samples.iter().enumerate() {
            if sample.features.len() != channels || sample.target.len() != output_channels {
                return Err(BotAiError::ShapeMismatch {
                    row,
                    expected: (channels, output_channels),
                    found: (sample.features.len(), sample.target.len()),
                }
                .into());
            }
            input.extend_from_slice(&sample.features);
            output.extend_from_slice(&sample.target);
        }

        let input_tensor = Tensor::of_slice(&input)
            .reshape(&[batch_size as i64, channels as i64])
            .to(device);
        let output_tensor = Tensor::of_slice(&output)
            .reshape(&[batch_size as i64, output_channels as i64])
            .to(device);
        Ok((input_tensor, output_tensor))
    }
}

#[test]
fn test_to_tensors_shape() {
    let mut set = SampleSet::new();
    set.put(Sample {
        features: vec![1.0, 2.0, 3.0],
        target: vec![0.0, 1.0],
    });
    set.put(Sample {
        features: vec![4.0, 5.0, 6.0],
        target: vec![1.0, 0.0],
    });
    let (x, y) = set.to_tensors(Device::Cpu).unwrap();
    assert_eq!(x.size(), vec![2, 3]);
    assert_eq!(y.size(), vec![2, 2]);
    assert_eq!(x.double_value(&[1, 2]), 6.0);
    assert_eq!(y.double_value(&[0, 1]), 1.0);
}

#[test]
fn test_empty_set_is_error() {
    let err = SampleSet::new().to_tensors(Device::Cpu).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BotAiError>(),
        Some(BotAiError::NoTrainingSamples)
    ));
}

#[test]
fn test_ragged_rows_are_error() {
    let mut set = SampleSet::new();
    set.put(Sample {
        features: vec![1.0, 2.0],
        target: vec![1.0],
    });
    set.put(Sample {
        features: vec![1.0],
        target: vec![1.0],
    });
    let err = set.to_tensors(Device::Cpu).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BotAiError>(),
        Some(BotAiError::ShapeMismatch { row: 1, .. })
    ));
}
