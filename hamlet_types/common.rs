use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Wood,
    Clay,
    Iron,
    Crop,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Wood,
        ResourceKind::Clay,
        ResourceKind::Iron,
        ResourceKind::Crop,
    ];
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Wood => "wood",
            ResourceKind::Clay => "clay",
            ResourceKind::Iron => "iron",
            ResourceKind::Crop => "crop",
        };
        f.write_str(name)
    }
}

/// Quantities of (wood, clay, iron, crop).
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroup(pub u32, pub u32, pub u32, pub u32);

impl ResourceGroup {
    pub const fn new(wood: u32, clay: u32, iron: u32, crop: u32) -> Self {
        Self(wood, clay, iron, crop)
    }

    pub const fn zero() -> Self {
        Self(0, 0, 0, 0)
    }

    pub fn total(&self) -> u32 {
        self.0
            .saturating_add(self.1)
            .saturating_add(self.2)
            .saturating_add(self.3)
    }

    pub fn wood(&self) -> u32 {
        self.0
    }
    pub fn clay(&self) -> u32 {
        self.1
    }
    pub fn iron(&self) -> u32 {
        self.2
    }
    pub fn crop(&self) -> u32 {
        self.3
    }

    pub fn get(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Wood => self.0,
            ResourceKind::Clay => self.1,
            ResourceKind::Iron => self.2,
            ResourceKind::Crop => self.3,
        }
    }

    /// Returns a copy with only the given resource set.
    pub fn only(kind: ResourceKind, amount: u32) -> Self {
        let mut group = Self::zero();
        match kind {
            ResourceKind::Wood => group.0 = amount,
            ResourceKind::Clay => group.1 = amount,
            ResourceKind::Iron => group.2 = amount,
            ResourceKind::Crop => group.3 = amount,
        }
        group
    }

    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }

    /// True when every component is greater than or equal to `other`'s.
    pub fn covers(&self, other: &ResourceGroup) -> bool {
        self.0 >= other.0 && self.1 >= other.1 && self.2 >= other.2 && self.3 >= other.3
    }

    /// Component-wise subtraction, `None` if any component would go negative.
    pub fn checked_sub(&self, other: &ResourceGroup) -> Option<ResourceGroup> {
        Some(ResourceGroup(
            self.0.checked_sub(other.0)?,
            self.1.checked_sub(other.1)?,
            self.2.checked_sub(other.2)?,
            self.3.checked_sub(other.3)?,
        ))
    }

    /// What is missing from `self` to cover `cost`, zero where there is enough.
    pub fn shortfall(&self, cost: &ResourceGroup) -> ResourceGroup {
        ResourceGroup(
            cost.0.saturating_sub(self.0),
            cost.1.saturating_sub(self.1),
            cost.2.saturating_sub(self.2),
            cost.3.saturating_sub(self.3),
        )
    }

    pub fn saturating_add(&self, other: &ResourceGroup) -> ResourceGroup {
        ResourceGroup(
            self.0.saturating_add(other.0),
            self.1.saturating_add(other.1),
            self.2.saturating_add(other.2),
            self.3.saturating_add(other.3),
        )
    }

    pub fn saturating_mul(&self, rhs: u32) -> ResourceGroup {
        ResourceGroup(
            self.0.saturating_mul(rhs),
            self.1.saturating_mul(rhs),
            self.2.saturating_mul(rhs),
            self.3.saturating_mul(rhs),
        )
    }
}

/// Scales every component, rounding to the nearest integer.
impl core::ops::Mul<f64> for ResourceGroup {
    type Output = ResourceGroup;

    fn mul(self, rhs: f64) -> Self::Output {
        let wood = (self.0 as f64 * rhs).round() as u32;
        let clay = (self.1 as f64 * rhs).round() as u32;
        let iron = (self.2 as f64 * rhs).round() as u32;
        let crop = (self.3 as f64 * rhs).round() as u32;
        ResourceGroup(wood, clay, iron, crop)
    }
}

impl core::ops::Add for ResourceGroup {
    type Output = ResourceGroup;

    fn add(self, rhs: ResourceGroup) -> Self::Output {
        self.saturating_add(&rhs)
    }
}

/// Lists the non-zero components, e.g. `120 wood, 40 iron`.
impl fmt::Display for ResourceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = ResourceKind::ALL
            .iter()
            .filter(|kind| self.get(**kind) > 0)
            .map(|kind| format!("{} {}", self.get(*kind), kind))
            .collect();

        if parts.is_empty() {
            return f.write_str("nothing");
        }
        f.write_str(&parts.join(", "))
    }
}
