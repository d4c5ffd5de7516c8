use std::fs;
use std::path::PathBuf;

use bot_ai::config::Config;
use bot_ai::learn::item::environment::{Decision, Exchange};
use bot_ai::learn::state_to_feature::USE_ITEMS;
use bot_ai::learn::training_data::TrainingData;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bot_ai_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn config() -> Config {
    Config {
        seed: Some(1234),
        ..Default::default()
    }
}

fn read_result(dir: &PathBuf) -> serde_json::Value {
    let json = fs::read_to_string(dir.join("result.json")).unwrap();
    serde_json::from_str(&json).unwrap()
}

#[test]
fn test_buy_writes_result() {
    let dir = scratch_dir("buy");
    fs::write(
        dir.join("training_data.json"),
        r#"{
            "roundItemPurchasesList": [
                { "round": 1, "items": [ { "key": "Pogo Stick", "value": 4 } ] },
                { "round": 2, "items": [ { "key": "Pogo Stick", "value": 1 } ] },
                { "round": 3, "items": [ { "key": "Pogo Stick", "value": 2 } ] }
            ],
            "itemUseFrequencyList": [ { "key": "Pogo Stick", "value": 7 } ],
            "tileItemUsageList": [ { "tile": 9, "items": [ { "key": "Pogo Stick", "value": 7 } ] } ],
            "itemHitEvents": []
        }"#,
    )
    .unwrap();
    fs::write(
        dir.join("state.json"),
        r#"{ "player": "Bot 1", "tiles": 4, "points": 20, "ownedItems": [], "round": 2 }"#,
    )
    .unwrap();

    let mut exchange = Exchange::new(&dir);
    let decision = bot_ai::run_purchase(&mut exchange, &config()).unwrap();
    assert_eq!(decision, Some(Decision::Buy("Pogo Stick".to_string())));
    assert_eq!(
        read_result(&dir),
        serde_json::json!({ "itemToBuy": "Pogo Stick" })
    );
    let raw = fs::read_to_string(dir.join("result.json")).unwrap();
    assert!(raw.contains("\n    \"itemToBuy\""));
}

#[test]
fn test_buy_without_training_data_writes_nothing() {
    let dir = scratch_dir("buy_no_training");
    fs::write(dir.join("state.json"), "{}").unwrap();

    let mut exchange = Exchange::new(&dir);
    assert_eq!(bot_ai::run_purchase(&mut exchange, &config()).unwrap(), None);
    assert!(!dir.join("result.json").exists());
}

#[test]
fn test_buy_without_state_writes_nothing() {
    let dir = scratch_dir("buy_no_state");
    fs::write(dir.join("training_data.json"), "{}").unwrap();

    let mut exchange = Exchange::new(&dir);
    assert_eq!(bot_ai::run_purchase(&mut exchange, &config()).unwrap(), None);
    assert!(!dir.join("result.json").exists());
}

#[test]
fn test_buy_with_empty_history_fails() {
    let dir = scratch_dir("buy_empty");
    fs::write(dir.join("training_data.json"), "{}").unwrap();
    fs::write(dir.join("state.json"), "{}").unwrap();

    let mut exchange = Exchange::new(&dir);
    assert!(bot_ai::run_purchase(&mut exchange, &config()).is_err());
    assert!(!dir.join("result.json").exists());
}

#[test]
fn test_use_overwrites_result() {
    let dir = scratch_dir("use");
    fs::write(dir.join("result.json"), r#"{ "itemToUse": "stale" }"#).unwrap();
    fs::write(
        dir.join("state.json"),
        r#"{ "player": "Bot 3", "tiles": 33, "points": 15, "ownedItems": ["Bomb", "Shield"], "round": 5,
             "tilesToFirstPlayer": 12, "tilesToSnake": 4 }"#,
    )
    .unwrap();

    let mut exchange = Exchange::new(&dir);
    let decision = bot_ai::run_use(&mut exchange, &config()).unwrap();
    assert_eq!(decision, Some(Decision::Use("Bomb".to_string())));
    assert_eq!(read_result(&dir), serde_json::json!({ "itemToUse": "Bomb" }));
}

#[test]
fn test_use_without_state_writes_nothing() {
    let dir = scratch_dir("use_no_state");
    let mut exchange = Exchange::new(&dir);
    assert_eq!(bot_ai::run_use(&mut exchange, &config()).unwrap(), None);
    assert!(!dir.join("result.json").exists());
}

#[test]
fn test_malformed_state_is_error() {
    let dir = scratch_dir("use_malformed");
    fs::write(dir.join("state.json"), "{ \"tiles\": ").unwrap();
    let mut exchange = Exchange::new(&dir);
    assert!(bot_ai::run_use(&mut exchange, &config()).is_err());
}

#[test]
fn test_record_creates_and_updates_training_data() {
    let dir = scratch_dir("record");
    let exchange = Exchange::new(&dir);
    bot_ai::record_purchase(&exchange, "Shield", 1).unwrap();
    bot_ai::record_purchase(&exchange, "Shield", 1).unwrap();
    bot_ai::record_use(&exchange, "Bomb", 27).unwrap();

    let data = TrainingData::load(&dir.join("training_data.json"))
        .unwrap()
        .unwrap();
    assert_eq!(data.round_item_purchases[&1]["Shield"], 2);
    assert_eq!(data.item_use_frequency["Bomb"], 1);
    assert_eq!(data.tile_item_usage[&27]["Bomb"], 1);
}

#[test]
fn test_use_with_no_usable_items_still_writes_catalog_item() {
    let dir = scratch_dir("use_nothing_owned");
    fs::write(
        dir.join("state.json"),
        r#"{ "player": "Bot 4", "tiles": 8, "points": 5, "ownedItems": [], "round": 2 }"#,
    )
    .unwrap();

    let mut exchange = Exchange::new(&dir);
    let decision = bot_ai::run_use(&mut exchange, &config()).unwrap().unwrap();
    assert!(USE_ITEMS.contains(&decision.item()));

    let result = read_result(&dir);
    let item = result["itemToUse"].as_str().unwrap();
    assert!(USE_ITEMS.contains(&item));
    assert_eq!(item, decision.item());
    assert_eq!(result.as_object().unwrap().len(), 1);
}
