use anyhow::Result;
use tracing::{debug, info};

use super::{
    brain::{Brain, ItemNet},
    environment::{BotState, Decision},
};
use crate::config::Config;
use crate::error::BotAiError;
use crate::learn::{
    memory::{Sample, SampleSet},
    state_to_feature::{
        one_hot, purchase_features, purchase_index, purchase_item, use_features, use_index,
        use_item, PURCHASE_ACTION_SIZE, PURCHASE_STATE_SIZE, USE_ACTION_SIZE, USE_ITEMS,
        USE_STATE_SIZE,
    },
    training_data::TrainingData,
};

/// Index of the first maximum. A NaN counts as the maximum, so the first NaN
/// wins over any number.
pub fn argmax(probs: &[f32]) -> Option<usize> {
    let mut max_value = f32::NEG_INFINITY;
    let mut max_index = None;
    for (i, v) in probs.iter().enumerate() {
        if v.is_nan() {
            return Some(i);
        }
        if max_index.is_none() || max_value < *v {
            max_index = Some(i);
            max_value = *v;
        }
    }
    max_index
}

/// Seeds libtorch from `config` right before the weights are drawn.
fn build_net(config: &Config, input_size: usize, output_size: usize) -> Result<ItemNet> {
    if let Some(seed) = config.seed {
        crate::seed(seed);
    }
    ItemNet::new(input_size, config.hidden, output_size, config.learning_rate)
}

fn synthetic_state(tiles: f32, round: f32) -> BotState {
    BotState {
        tiles,
        round,
        points: 50.0,
        ..Default::default()
    }
}

pub struct PurchaseAgent {
    config: Config,
}

impl PurchaseAgent {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// One sample per (round, item) and per (tile, item) pair; counts only
    /// decide whether a pair exists.
    pub fn generate_samples(training: &TrainingData) -> SampleSet {
        let mut samples = SampleSet::new();
        for (round, items) in training.round_item_purchases.iter() {
            for item in items.keys() {
                let state = synthetic_state(0.0, *round as f32);
                samples.put(Sample {
                    features: purchase_features(&state).to_vec(),
                    target: one_hot(purchase_index(item), PURCHASE_ACTION_SIZE),
                });
            }
        }
        for (tile, items) in training.tile_item_usage.iter() {
            for item in items.keys() {
                let state = synthetic_state(*tile as f32, 1.0);
                samples.put(Sample {
                    features: purchase_features(&state).to_vec(),
                    target: one_hot(purchase_index(item), PURCHASE_ACTION_SIZE),
                });
            }
        }
        samples
    }

    pub fn probabilities(&self, training: &TrainingData, state: &BotState) -> Result<Vec<f32>> {
        let samples = Self::generate_samples(training);
        if samples.is_empty() {
            return Err(BotAiError::NoTrainingSamples.into());
        }
        let mut net = build_net(&self.config, PURCHASE_STATE_SIZE, PURCHASE_ACTION_SIZE)?;
        let loss = net.train(&samples, self.config.epochs_purchase)?;
        info!(samples = samples.len(), loss, "Trained purchase network");

        let probs = net.forward(&purchase_features(state))?;
        debug!(?probs, "Purchase probabilities");
        Ok(probs)
    }

    pub fn decide(&self, training: &TrainingData, state: &BotState) -> Result<Decision> {
        let probs = self.probabilities(training, state)?;
        let index = argmax(&probs).ok_or(BotAiError::EmptyOutput)?;
        Ok(Decision::Buy(purchase_item(index).to_string()))
    }
}

pub struct UseAgent {
    config: Config,
}

impl UseAgent {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// One copy of the current state per usable item, labelled with that item
    /// when the bot owns it.
    pub fn generate_samples(state: &BotState) -> SampleSet {
        let mut samples = SampleSet::new();
        let features = use_features(state);
        for item in USE_ITEMS.iter() {
            let index = if state.owns(item) {
                use_index(item)
            } else {
                None
            };
            samples.put(Sample {
                features: features.to_vec(),
                target: one_hot(index, USE_ACTION_SIZE),
            });
        }
        samples
    }

    pub fn probabilities(&self, state: &BotState) -> Result<Vec<f32>> {
        let samples = Self::generate_samples(state);
        let mut net = build_net(&self.config, USE_STATE_SIZE, USE_ACTION_SIZE)?;
        let loss = net.train(&samples, self.config.epochs_use)?;
        info!(samples = samples.len(), loss, "Trained item-use network");

        let probs = net.forward(&use_features(state))?;
        debug!(?probs, "Item-use probabilities");
        Ok(probs)
    }

    pub fn decide(&self, state: &BotState) -> Result<Decision> {
        let probs = self.probabilities(state)?;
        let index = argmax(&probs).ok_or(BotAiError::EmptyOutput)?;
        Ok(Decision::Use(use_item(index).to_string()))
    }
}

#[cfg(test)]
fn seeded() -> Config {
    Config {
        seed: Some(42),
        ..Default::default()
    }
}

#[test]
fn test_argmax_first_wins() {
    assert_eq!(argmax(&[0.1, 0.4, 0.4, 0.1]), Some(1));
    assert_eq!(argmax(&[0.9]), Some(0));
    assert_eq!(argmax(&[]), None);
}

#[test]
fn test_argmax_nan_wins() {
    assert_eq!(argmax(&[0.2, f32::NAN, 0.9, f32::NAN]), Some(1));
    assert_eq!(argmax(&[f32::NAN, 0.5]), Some(0));
}

#[test]
fn test_purchase_samples() {
    let mut training = TrainingData::default();
    training.record_item_bought("Bomb", 2);
    training.record_item_bought("Bomb", 2);
    training.record_item_bought("Rubber Duck", 3);
    training.record_item_used("Points Multiplier", 40);
    // item use frequency never produces samples
    training.item_use_frequency.insert("Shield".to_string(), 8);

    let samples: Vec<Sample> = PurchaseAgent::generate_samples(&training)
        .iter()
        .cloned()
        .collect();
    assert_eq!(samples.len(), 3);
    assert_eq!(samples[0].features, vec![0.0, 2.0, 50.0, 0.0, 0.0]);
    assert_eq!(samples[0].target, one_hot(Some(1), PURCHASE_ACTION_SIZE));
    assert_eq!(samples[1].features, vec![0.0, 3.0, 50.0, 0.0, 0.0]);
    assert_eq!(samples[1].target, vec![0.0; PURCHASE_ACTION_SIZE]);
    assert_eq!(samples[2].features, vec![40.0, 1.0, 50.0, 0.0, 0.0]);
    assert_eq!(samples[2].target, one_hot(Some(6), PURCHASE_ACTION_SIZE));
}

#[test]
fn test_use_samples() {
    let state = BotState {
        owned_items: vec!["Stun Gun".to_string(), "Shield".to_string()],
        ..Default::default()
    };
    let samples: Vec<Sample> = UseAgent::generate_samples(&state).iter().cloned().collect();
    assert_eq!(samples.len(), USE_ITEMS.len());
    assert!(samples.iter().all(|s| s.features == use_features(&state).to_vec()));
    assert_eq!(samples[0].target, vec![0.0; USE_ACTION_SIZE]);
    assert_eq!(samples[3].target, vec![0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn test_purchase_follows_history() {
    let mut training = TrainingData::default();
    for round in 1..=4 {
        training.record_item_bought("Shield", round);
    }
    training.record_item_used("Shield", 10);
    let agent = PurchaseAgent::new(seeded());
    let state = BotState {
        round: 2.0,
        ..Default::default()
    };
    assert_eq!(
        agent.decide(&training, &state).unwrap(),
        Decision::Buy("Shield".to_string())
    );
}

#[test]
fn test_purchase_without_samples_fails() {
    let agent = PurchaseAgent::new(seeded());
    let err = agent
        .decide(&TrainingData::default(), &BotState::default())
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BotAiError>(),
        Some(BotAiError::NoTrainingSamples)
    ));
}

#[test]
fn test_use_picks_owned_item() {
    let state = BotState {
        tiles: 20.0,
        round: 3.0,
        points: 10.0,
        owned_items: vec!["Pogo Stick".to_string()],
        ..Default::default()
    };
    let agent = UseAgent::new(seeded());
    assert_eq!(
        agent.decide(&state).unwrap(),
        Decision::Use("Pogo Stick".to_string())
    );
}
