pub mod item;
pub mod memory;
pub mod state_to_feature;
pub mod training_data;
