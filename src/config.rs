/// Ten minutes per side
pub const DEFAULT_CLOCK_MS: u64 = 10 * 60 * 1000;

/// Settings a game is created with. `GameState::reset` restores these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub initial_clock_ms: u64,
}

impl GameConfig {
    pub fn with_clock_ms(initial_clock_ms: u64) -> Self {
        Self { initial_clock_ms }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_clock_ms: DEFAULT_CLOCK_MS,
        }
    }
}
