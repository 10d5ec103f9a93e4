use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, Deserialize, Serialize)]
pub enum WarriorName {
    Swordsman,
    Spearman,
    Archer,
    Horseman,
    Catapult,
}

impl WarriorName {
    pub const ALL: [WarriorName; 5] = [
        WarriorName::Swordsman,
        WarriorName::Spearman,
        WarriorName::Archer,
        WarriorName::Horseman,
        WarriorName::Catapult,
    ];
}

impl fmt::Display for WarriorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WarriorName::Swordsman => "Swordsman",
            WarriorName::Spearman => "Spearman",
            WarriorName::Archer => "Archer",
            WarriorName::Horseman => "Horseman",
            WarriorName::Catapult => "Catapult",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownWarriorName(pub String);

impl fmt::Display for UnknownWarriorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown warrior name '{}'", self.0)
    }
}

impl std::error::Error for UnknownWarriorName {}

impl FromStr for WarriorName {
    type Err = UnknownWarriorName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WarriorName::ALL
            .into_iter()
            .find(|name| name.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownWarriorName(s.to_string()))
    }
}
