#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub epochs_purchase: usize,
    pub epochs_use: usize,
    pub learning_rate: f64,
    pub hidden: i64,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            epochs_purchase: 500,
            epochs_use: 300,
            learning_rate: 0.01,
            hidden: 16,
            seed: None,
        }
    }
}

impl Config {
    /// Overrides both pipelines' epoch count.
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs_purchase = epochs;
        self.epochs_use = epochs;
        self
    }
}
