use anyhow::Result;
use tracing::{debug, trace};

use tch::{
    nn,
    nn::{Module, Optimizer, OptimizerConfig, VarStore},
    Device, Kind, Reduction, Tensor,
};

use crate::error::BotAiError;
use crate::learn::memory::SampleSet;

fn network(vs: &nn::Path, input_size: i64, hidden: i64, output_size: i64) -> impl Module {
    nn::seq()
        .add(nn::linear(vs / "layer1", input_size, hidden, Default::default()))
        .add_fn(|xs| xs.relu())
        .add(nn::linear(vs / "layer2", hidden, output_size, Default::default()))
        .add_fn(|xs| xs.softmax(-1, Kind::Float))
}

pub trait Brain {
    fn train(&mut self, samples: &SampleSet, epochs: usize) -> Result<f64>;
    fn forward(&self, features: &[f32]) -> Result<Vec<f32>>;
}

/// Two-layer softmax classifier fitted with Adam on a squared-error loss.
pub struct ItemNet {
    device: Device,
    input_size: i64,
    _vs: VarStore,
    net: Box<dyn Module>,
    opt: Optimizer,
}

impl ItemNet {
    pub fn new(input_size: usize, hidden: i64, output_size: usize, learning_rate: f64) -> Result<Self> {
        let device = Device::Cpu;
        let vs = VarStore::new(device);
        let net = Box::new(network(
            &vs.root(),
            input_size as i64,
            hidden,
            output_size as i64,
        ));
        let opt = nn::Adam::default().build(&vs, learning_rate)?;
        Ok(Self {
            device,
            input_size: input_size as i64,
            _vs: vs,
            net,
            opt,
        })
    }
}

impl Brain for ItemNet {
    fn train(&mut self, samples: &SampleSet, epochs: usize) -> Result<f64> {
        let (input_tensor, output_tensor) = samples.to_tensors(self.device)?;

        let mut last_loss = f64::NAN;
        for epoch in 0..epochs {
            let res = self.net.forward(&input_tensor);
            let loss = res.mse_loss(&output_tensor, Reduction::Mean);
            self.opt.backward_step(&loss);
            last_loss = f64::from(&loss);
            trace!(epoch, loss = last_loss);
        }
        debug!(epochs, samples = samples.len(), loss = last_loss, "Training finished");
        Ok(last_loss)
    }

    fn forward(&self, features: &[f32]) -> Result<Vec<f32>> {
        let input_tensor = Tensor::of_slice(features)
            .reshape(&[1, self.input_size])
            .to(self.device);
        let result = tch::no_grad(|| self.net.forward(&input_tensor));
        let mut rows: Vec<Vec<f32>> = result.into();
        rows.pop().ok_or_else(|| BotAiError::EmptyOutput.into())
    }
}

#[cfg(test)]
use crate::learn::memory::Sample;

#[test]
fn test_forward_is_distribution() {
    tch::manual_seed(7);
    let net = ItemNet::new(3, 16, 4, 0.01).unwrap();
    let probs = net.forward(&[1.0, 2.0, 3.0]).unwrap();
    assert_eq!(probs.len(), 4);
    let total: f32 = probs.iter().sum();
    assert!((total - 1.0).abs() < 1e-4);
    assert!(probs.iter().all(|p| *p >= 0.0));
}

#[test]
fn test_training_reduces_loss() {
    tch::manual_seed(7);
    let mut samples = SampleSet::new();
    samples.put(Sample {
        features: vec![0.0, 1.0],
        target: vec![1.0, 0.0],
    });
    samples.put(Sample {
        features: vec![1.0, 0.0],
        target: vec![0.0, 1.0],
    });
    let mut net = ItemNet::new(2, 16, 2, 0.01).unwrap();
    let before = net.train(&samples, 1).unwrap();
    let after = net.train(&samples, 300).unwrap();
    assert!(after < before);

    let a = net.forward(&[0.0, 1.0]).unwrap();
    let b = net.forward(&[1.0, 0.0]).unwrap();
    assert!(a[0] > a[1]);
    assert!(b[1] > b[0]);
}
