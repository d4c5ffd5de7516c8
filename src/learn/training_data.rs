use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
struct KeyValue {
    key: String,
    value: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
struct RoundEntry {
    round: i64,
    #[serde(default)]
    items: Vec<KeyValue>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
struct TileEntry {
    tile: i64,
    #[serde(default)]
    items: Vec<KeyValue>,
}

/// On-disk layout written by the engine: every map is flattened into a list
/// of entries.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct RawTrainingData {
    #[serde(default)]
    round_item_purchases_list: Vec<RoundEntry>,
    #[serde(default)]
    item_use_frequency_list: Vec<KeyValue>,
    #[serde(default)]
    tile_item_usage_list: Vec<TileEntry>,
    #[serde(default)]
    item_hit_events: Vec<serde_json::Value>,
}

pub type ItemCounts = BTreeMap<String, u32>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainingData {
    pub round_item_purchases: BTreeMap<i64, ItemCounts>,
    pub item_use_frequency: ItemCounts,
    pub tile_item_usage: BTreeMap<i64, ItemCounts>,
    pub item_hit_events: Vec<serde_json::Value>,
}

fn to_counts(items: Vec<KeyValue>) -> ItemCounts {
    items.into_iter().map(|kv| (kv.key, kv.value)).collect()
}

fn from_counts(counts: &ItemCounts) -> Vec<KeyValue> {
    counts
        .iter()
        .map(|(key, value)| KeyValue {
            key: key.clone(),
            value: *value,
        })
        .collect()
}

impl From<RawTrainingData> for TrainingData {
    fn from(raw: RawTrainingData) -> Self {
        Self {
            round_item_purchases: raw
                .round_item_purchases_list
                .into_iter()
                .map(|e| (e.round, to_counts(e.items)))
                .collect(),
            item_use_frequency: to_counts(raw.item_use_frequency_list),
            tile_item_usage: raw
                .tile_item_usage_list
                .into_iter()
                .map(|e| (e.tile, to_counts(e.items)))
                .collect(),
            item_hit_events: raw.item_hit_events,
        }
    }
}

impl From<&TrainingData> for RawTrainingData {
    fn from(data: &TrainingData) -> Self {
        Self {
            round_item_purchases_list: data
                .round_item_purchases
                .iter()
                .map(|(round, items)| RoundEntry {
                    round: *round,
                    items: from_counts(items),
                })
                .collect(),
            item_use_frequency_list: from_counts(&data.item_use_frequency),
            tile_item_usage_list: data
                .tile_item_usage
                .iter()
                .map(|(tile, items)| TileEntry {
                    tile: *tile,
                    items: from_counts(items),
                })
                .collect(),
            item_hit_events: data.item_hit_events.clone(),
        }
    }
}

impl TrainingData {
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawTrainingData = serde_json::from_str(json)?;
        Ok(raw.into())
    }

    pub fn to_json(&self) -> Result<String> {
        crate::to_pretty_json(&RawTrainingData::from(self))
    }

    /// Returns `Ok(None)` when there is no file at `path`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading training data {}", path.display()))?;
        let data = Self::from_json(&json)
            .with_context(|| format!("parsing training data {}", path.display()))?;
        Ok(Some(data))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)
            .with_context(|| format!("writing training data {}", path.display()))
    }

    pub fn record_item_bought(&mut self, item: &str, round: i64) {
        *self
            .round_item_purchases
            .entry(round)
            .or_default()
            .entry(item.to_string())
            .or_insert(0) += 1;
    }

    pub fn record_item_used(&mut self, item: &str, tile: i64) {
        *self
            .item_use_frequency
            .entry(item.to_string())
            .or_insert(0) += 1;
        *self
            .tile_item_usage
            .entry(tile)
            .or_default()
            .entry(item.to_string())
            .or_insert(0) += 1;
    }
}

#[test]
fn test_parse_engine_layout() {
    let json = r#"{
        "roundItemPurchasesList": [
            { "round": 1, "items": [ { "key": "Bomb", "value": 3 }, { "key": "Shield", "value": 1 } ] },
            { "round": 2, "items": [ { "key": "Pogo Stick", "value": 2 } ] }
        ],
        "itemUseFrequencyList": [ { "key": "Bomb", "value": 5 } ],
        "tileItemUsageList": [ { "tile": 14, "items": [ { "key": "Bomb", "value": 2 } ] } ],
        "itemHitEvents": [ { "attacker": "Bot 1", "target": "Bot 2" } ]
    }"#;
    let data = TrainingData::from_json(json).unwrap();
    assert_eq!(data.round_item_purchases.len(), 2);
    assert_eq!(data.round_item_purchases[&1]["Bomb"], 3);
    assert_eq!(data.round_item_purchases[&2]["Pogo Stick"], 2);
    assert_eq!(data.item_use_frequency["Bomb"], 5);
    assert_eq!(data.tile_item_usage[&14]["Bomb"], 2);
    assert_eq!(data.item_hit_events.len(), 1);
}

#[test]
fn test_missing_lists_default_to_empty() {
    let data = TrainingData::from_json("{}").unwrap();
    assert_eq!(data, TrainingData::default());
}

#[test]
fn test_later_entries_win() {
    let json = r#"{
        "roundItemPurchasesList": [
            { "round": 1, "items": [ { "key": "Bomb", "value": 3 } ] },
            { "round": 1, "items": [ { "key": "Shield", "value": 4 }, { "key": "Shield", "value": 9 } ] }
        ]
    }"#;
    let data = TrainingData::from_json(json).unwrap();
    assert_eq!(data.round_item_purchases.len(), 1);
    assert_eq!(data.round_item_purchases[&1].len(), 1);
    assert_eq!(data.round_item_purchases[&1]["Shield"], 9);
}

#[test]
fn test_record_and_reload() {
    let mut data = TrainingData::default();
    data.record_item_bought("Bomb", 2);
    data.record_item_bought("Bomb", 2);
    data.record_item_used("Pogo Stick", 31);
    assert_eq!(data.round_item_purchases[&2]["Bomb"], 2);
    assert_eq!(data.item_use_frequency["Pogo Stick"], 1);
    assert_eq!(data.tile_item_usage[&31]["Pogo Stick"], 1);

    let json = data.to_json().unwrap();
    assert!(json.contains("\"roundItemPurchasesList\""));
    assert_eq!(TrainingData::from_json(&json).unwrap(), data);
}

#[test]
fn test_malformed_json_is_error() {
    assert!(TrainingData::from_json("{ \"itemUseFrequencyList\": 3 }").is_err());
}
