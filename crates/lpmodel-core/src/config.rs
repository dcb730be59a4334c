/// Value standing in for an infinite bound (COIN-OR's `COIN_DBL_MAX`)
pub const COIN_INFINITY: f64 = 1.79769313486e+308;

/// Settings shared by every constraint a model evaluates
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelConfig {
    /// Magnitude used for unset lower/upper bounds
    infinity: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            infinity: COIN_INFINITY,
        }
    }
}

impl ModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_infinity(mut self, infinity: f64) -> Self {
        self.infinity = infinity.abs();
        self
    }

    pub fn infinity(&self) -> f64 {
        self.infinity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_coin_infinity() {
        assert_eq!(ModelConfig::new().infinity(), COIN_INFINITY);
    }

    #[test]
    fn test_with_infinity_uses_magnitude() {
        let config = ModelConfig::new().with_infinity(-1e20);
        assert_eq!(config.infinity(), 1e20);
    }
}
