pub mod config;
pub mod error;
pub mod learn;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::learn::item::{
    agent::{PurchaseAgent, UseAgent},
    environment::{Decision, Environment, Exchange},
};

/// JSON with a four-space indent, the layout the engine writes and expects.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}

/// Seeds libtorch so weight initialisation is reproducible.
pub fn seed(seed: u64) {
    tch::manual_seed(seed as i64);
}

/// Loads training data and state, trains, and writes `itemToBuy`.
/// Returns `Ok(None)` without touching the result file if an input is missing.
pub fn run_purchase(exchange: &mut Exchange, config: &Config) -> Result<Option<Decision>> {
    let training = match exchange.training_data()? {
        Some(training) => training,
        None => return Ok(None),
    };
    let state = match exchange.observe()? {
        Some(state) => state,
        None => return Ok(None),
    };

    let decision = PurchaseAgent::new(config.clone()).decide(&training, &state)?;
    exchange.act(&decision)?;
    info!(player = %state.player, item = decision.item(), "Purchase decision saved");
    Ok(Some(decision))
}

/// Trains on the current state alone and writes `itemToUse`.
pub fn run_use(exchange: &mut Exchange, config: &Config) -> Result<Option<Decision>> {
    let state = match exchange.observe()? {
        Some(state) => state,
        None => return Ok(None),
    };
    if state.owned_items.is_empty() {
        warn!(player = %state.player, "Bot owns no items; prediction is arbitrary");
    }

    let decision = UseAgent::new(config.clone()).decide(&state)?;
    exchange.act(&decision)?;
    info!(player = %state.player, item = decision.item(), "Item-use decision saved");
    Ok(Some(decision))
}

pub fn record_purchase(exchange: &Exchange, item: &str, round: i64) -> Result<()> {
    let path = exchange.training_data_path();
    let mut data = learn::training_data::TrainingData::load(&path)?.unwrap_or_default();
    data.record_item_bought(item, round);
    data.save(&path)?;
    info!(item, round, "Recorded purchase");
    Ok(())
}

pub fn record_use(exchange: &Exchange, item: &str, tile: i64) -> Result<()> {
    let path = exchange.training_data_path();
    let mut data = learn::training_data::TrainingData::load(&path)?.unwrap_or_default();
    data.record_item_used(item, tile);
    data.save(&path)?;
    info!(item, tile, "Recorded item use");
    Ok(())
}
