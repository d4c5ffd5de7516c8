use crate::learn::item::environment::BotState;

pub const PURCHASE_STATE_SIZE: usize = 5;
pub const USE_STATE_SIZE: usize = 9;

// "Points Multiplier" is listed twice; name lookups resolve to the later slot.
pub const PURCHASE_ITEMS: [&str; 7] = [
    "Pogo Stick",
    "Bomb",
    "Stun Gun",
    "Points Multiplier",
    "Shield",
    "Anti Snake Spray",
    "Points Multiplier",
];
pub const PURCHASE_ACTION_SIZE: usize = PURCHASE_ITEMS.len();

pub const USE_ITEMS: [&str; 4] = ["Bomb", "Pogo Stick", "Points Multiplier", "Stun Gun"];
pub const USE_ACTION_SIZE: usize = USE_ITEMS.len();

fn flag(state: &BotState, item: &str) -> f32 {
    if state.owns(item) {
        1f32
    } else {
        0f32
    }
}

pub fn purchase_features(state: &BotState) -> [f32; PURCHASE_STATE_SIZE] {
    let shield = flag(state, "Shield");
    [
        state.tiles,
        state.round,
        state.points,
        shield,
        state.owned_items.len() as f32 - shield,
    ]
}

pub fn use_features(state: &BotState) -> [f32; USE_STATE_SIZE] {
    [
        state.tiles,
        state.round,
        state.points,
        flag(state, "Shield"),
        flag(state, "Anti Snake Spray"),
        flag(state, "Bomb"),
        flag(state, "Pogo Stick"),
        state.tiles_to_first_player,
        state.tiles_to_snake,
    ]
}

pub fn purchase_index(name: &str) -> Option<usize> {
    PURCHASE_ITEMS.iter().rposition(|item| *item == name)
}

pub fn use_index(name: &str) -> Option<usize> {
    USE_ITEMS.iter().rposition(|item| *item == name)
}

pub fn purchase_item(index: usize) -> &'static str {
    PURCHASE_ITEMS[index]
}

pub fn use_item(index: usize) -> &'static str {
    USE_ITEMS[index]
}

/// Target row for `index`; `None` (an item outside the catalog) yields all zeros.
pub fn one_hot(index: Option<usize>, size: usize) -> Vec<f32> {
    let mut res = vec![0f32; size];
    if let Some(i) = index {
        res[i] = 1f32;
    }
    res
}

#[cfg(test)]
fn state(owned: &[&str]) -> BotState {
    BotState {
        tiles: 12.0,
        round: 3.0,
        points: 40.0,
        owned_items: owned.iter().map(|x| x.to_string()).collect(),
        tiles_to_first_player: 7.0,
        tiles_to_snake: 2.0,
        ..Default::default()
    }
}

#[test]
fn test_purchase_features() {
    assert_eq!(
        purchase_features(&state(&["Shield", "Bomb", "Pogo Stick"])),
        [12.0, 3.0, 40.0, 1.0, 2.0]
    );
    assert_eq!(purchase_features(&state(&["Bomb"])), [12.0, 3.0, 40.0, 0.0, 1.0]);
    // only one shield is discounted
    assert_eq!(
        purchase_features(&state(&["Shield", "Shield"])),
        [12.0, 3.0, 40.0, 1.0, 1.0]
    );
}

#[test]
fn test_use_features() {
    assert_eq!(
        use_features(&state(&["Anti Snake Spray", "Pogo Stick"])),
        [12.0, 3.0, 40.0, 0.0, 1.0, 0.0, 1.0, 7.0, 2.0]
    );
}

#[test]
fn test_default_state_features() {
    let s = BotState::default();
    assert_eq!(purchase_features(&s), [0.0, 1.0, 0.0, 0.0, 0.0]);
    assert_eq!(use_features(&s), [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn test_catalog_lookup() {
    assert_eq!(purchase_index("Points Multiplier"), Some(6));
    assert_eq!(purchase_item(3), "Points Multiplier");
    assert_eq!(purchase_index("Shield"), Some(4));
    assert_eq!(purchase_index("Rubber Duck"), None);
    assert_eq!(use_index("Stun Gun"), Some(3));
    assert_eq!(use_index("Shield"), None);
    assert_eq!(use_item(1), "Pogo Stick");
}

#[test]
fn test_one_hot() {
    assert_eq!(one_hot(Some(2), 4), vec![0.0, 0.0, 1.0, 0.0]);
    assert_eq!(one_hot(None, 3), vec![0.0, 0.0, 0.0]);
}

#[cfg(test)]
quickcheck::quickcheck! {
    fn prop_shield_flag_matches_ownership(owned: Vec<String>, tiles: i16) -> bool {
        let s = BotState {
            tiles: tiles as f32,
            owned_items: owned.clone(),
            ..Default::default()
        };
        let p = purchase_features(&s);
        let u = use_features(&s);
        let has_shield = owned.iter().any(|x| x == "Shield");
        p[0] == tiles as f32
            && p[3] == u[3]
            && (p[3] == 1.0) == has_shield
            && p[3] + p[4] == owned.len() as f32
    }
}
