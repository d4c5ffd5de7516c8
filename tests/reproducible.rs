// Kept in its own test binary: libtorch's generator is process-global, so
// nothing else may draw weights while these runs are compared.

use bot_ai::config::Config;
use bot_ai::learn::item::agent::{PurchaseAgent, UseAgent};
use bot_ai::learn::item::environment::BotState;
use bot_ai::learn::training_data::TrainingData;

fn assert_close(a: &[f32], b: &[f32]) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b.iter()) {
        assert!((x - y).abs() < 1e-6, "{:?} != {:?}", a, b);
    }
}

#[test]
fn test_same_seed_same_probabilities() {
    let config = Config {
        seed: Some(5),
        epochs_purchase: 20,
        epochs_use: 20,
        ..Default::default()
    };

    let mut training = TrainingData::default();
    for round in 1..=6 {
        training.record_item_bought("Bomb", round);
        training.record_item_bought("Shield", round);
    }
    let state = BotState {
        tiles: 3.0,
        round: 2.0,
        points: 30.0,
        owned_items: vec!["Bomb".to_string(), "Stun Gun".to_string()],
        ..Default::default()
    };

    let first = PurchaseAgent::new(config.clone())
        .probabilities(&training, &state)
        .unwrap();
    let second = PurchaseAgent::new(config.clone())
        .probabilities(&training, &state)
        .unwrap();
    assert_close(&first, &second);
    assert_eq!(
        PurchaseAgent::new(config.clone())
            .decide(&training, &state)
            .unwrap(),
        PurchaseAgent::new(config.clone())
            .decide(&training, &state)
            .unwrap()
    );

    let first = UseAgent::new(config.clone()).probabilities(&state).unwrap();
    let second = UseAgent::new(config.clone()).probabilities(&state).unwrap();
    assert_close(&first, &second);
}
