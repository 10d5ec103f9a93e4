use serde::{Deserialize, Serialize};

/// Experience awarded per level reached by a completed construction.
pub const CONSTRUCTION_XP_PER_LEVEL: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub level: u32,
    pub experience: u32,
    pub health: u32,
    pub strength: u32,
    pub credits: u32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            level: 1,
            experience: 0,
            health: 100,
            strength: 10,
            credits: 0,
        }
    }
}

impl PlayerStats {
    /// Experience needed to leave the current level.
    pub fn next_level_threshold(&self) -> u32 {
        100 * self.level
    }

    /// Adds experience and levels up as long as the threshold is reached.
    /// Returns how many levels were gained.
    pub fn add_experience(&mut self, amount: u32) -> u32 {
        self.experience = self.experience.saturating_add(amount);
        let mut gained = 0;
        while self.experience >= self.next_level_threshold() {
            self.experience -= self.next_level_threshold();
            self.level += 1;
            gained += 1;
        }
        gained
    }
}
