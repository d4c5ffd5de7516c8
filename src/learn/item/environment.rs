use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::learn::training_data::TrainingData;

pub const STATE_FILE: &str = "state.json";
pub const TRAINING_DATA_FILE: &str = "training_data.json";
pub const RESULT_FILE: &str = "result.json";

fn first_round() -> f32 {
    1.0
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BotState {
    #[serde(default)]
    pub player: String,
    #[serde(default)]
    pub tiles: f32,
    #[serde(default = "first_round")]
    pub round: f32,
    #[serde(default)]
    pub points: f32,
    #[serde(default)]
    pub owned_items: Vec<String>,
    #[serde(default)]
    pub tiles_to_first_player: f32,
    #[serde(default)]
    pub tiles_to_snake: f32,
}

impl Default for BotState {
    fn default() -> Self {
        Self {
            player: String::new(),
            tiles: 0.0,
            round: first_round(),
            points: 0.0,
            owned_items: Vec::new(),
            tiles_to_first_player: 0.0,
            tiles_to_snake: 0.0,
        }
    }
}

impl BotState {
    pub fn owns(&self, item: &str) -> bool {
        self.owned_items.iter().any(|x| x == item)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    #[serde(rename = "itemToBuy")]
    Buy(String),
    #[serde(rename = "itemToUse")]
    Use(String),
}

impl Decision {
    pub fn item(&self) -> &str {
        match self {
            Decision::Buy(item) | Decision::Use(item) => item,
        }
    }
}

pub trait Environment {
    type Observable;
    type Action;

    fn observe(&self) -> Result<Option<Self::Observable>>;
    fn act(&mut self, action: &Self::Action) -> Result<()>;
}

/// The directory shared with the game engine.
#[derive(Debug, Clone)]
pub struct Exchange {
    dir: PathBuf,
}

impl Exchange {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    pub fn training_data_path(&self) -> PathBuf {
        self.dir.join(TRAINING_DATA_FILE)
    }

    pub fn result_path(&self) -> PathBuf {
        self.dir.join(RESULT_FILE)
    }

    pub fn training_data(&self) -> Result<Option<TrainingData>> {
        let path = self.training_data_path();
        let data = TrainingData::load(&path)?;
        if data.is_none() {
            warn!(path = %path.display(), "No training data found");
        }
        Ok(data)
    }
}

impl Environment for Exchange {
    type Observable = BotState;
    type Action = Decision;

    fn observe(&self) -> Result<Option<BotState>> {
        let path = self.state_path();
        if !path.exists() {
            warn!(path = %path.display(), "No state file found");
            return Ok(None);
        }
        let json = fs::read_to_string(&path)
            .with_context(|| format!("reading state {}", path.display()))?;
        let state: BotState = serde_json::from_str(&json)
            .with_context(|| format!("parsing state {}", path.display()))?;
        debug!(?state, "Loaded bot state");
        Ok(Some(state))
    }

    fn act(&mut self, action: &Decision) -> Result<()> {
        let path = self.result_path();
        fs::write(&path, crate::to_pretty_json(action)?)
            .with_context(|| format!("writing result {}", path.display()))?;
        debug!(path = %path.display(), item = action.item(), "Wrote result");
        Ok(())
    }
}

#[test]
fn test_parse_engine_state() {
    let json = r#"{
        "player": "Bot 2",
        "tiles": 17,
        "points": 35,
        "ownedItems": ["Shield", "Bomb"],
        "round": 4
    }"#;
    let state: BotState = serde_json::from_str(json).unwrap();
    assert_eq!(state.player, "Bot 2");
    assert_eq!(state.tiles, 17.0);
    assert_eq!(state.round, 4.0);
    assert_eq!(state.points, 35.0);
    assert!(state.owns("Shield"));
    assert!(!state.owns("Pogo Stick"));
    assert_eq!(state.tiles_to_snake, 0.0);
}

#[test]
fn test_empty_state_uses_defaults() {
    let state: BotState = serde_json::from_str("{}").unwrap();
    assert_eq!(state, BotState::default());
    assert_eq!(state.round, 1.0);
}

#[test]
fn test_decision_json() {
    let buy = crate::to_pretty_json(&Decision::Buy("Bomb".to_string())).unwrap();
    assert_eq!(buy, "{\n    \"itemToBuy\": \"Bomb\"\n}");
    let used: serde_json::Value =
        serde_json::to_value(Decision::Use("Pogo Stick".to_string())).unwrap();
    assert_eq!(used, serde_json::json!({ "itemToUse": "Pogo Stick" }));
}
