//! Resource amounts, production rates and exchange ratios.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Resources {
    pub metal: u64,
    pub crystal: u64,
    pub deuterium: u64,
}

impl Resources {
    pub const fn new(metal: u64, crystal: u64, deuterium: u64) -> Self {
        Self {
            metal,
            crystal,
            deuterium,
        }
    }

    pub fn deuterium(amount: u64) -> Self {
        Self::new(0, 0, amount)
    }

    pub fn total(&self) -> u64 {
        self.metal + self.crystal + self.deuterium
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    #[must_use]
    pub fn add(&self, other: &Resources) -> Resources {
        Resources::new(
            self.metal + other.metal,
            self.crystal + other.crystal,
            self.deuterium + other.deuterium,
        )
    }

    #[must_use]
    pub fn saturating_sub(&self, other: &Resources) -> Resources {
        Resources::new(
            self.metal.saturating_sub(other.metal),
            self.crystal.saturating_sub(other.crystal),
            self.deuterium.saturating_sub(other.deuterium),
        )
    }

    #[must_use]
    pub fn scale(&self, factor: f64) -> Resources {
        let f = |v: u64| (v as f64 * factor).floor() as u64;
        Resources::new(f(self.metal), f(self.crystal), f(self.deuterium))
    }

    pub fn is_enough_for(&self, cost: &Resources) -> bool {
        self.metal >= cost.metal && self.crystal >= cost.crystal && self.deuterium >= cost.deuterium
    }

    /// Enough to pay `cost` and still keep `reserve` in stock.
    pub fn is_enough_for_with_reserve(&self, cost: &Resources, reserve: &Resources) -> bool {
        self.is_enough_for(&cost.add(reserve))
    }

    /// Value expressed in metal units under the given ratio.
    pub fn conversion_value(&self, ratio: &ExchangeRatio) -> f64 {
        self.metal as f64
            + self.crystal as f64 * ratio.metal / ratio.crystal
            + self.deuterium as f64 * ratio.metal / ratio.deuterium
    }

    /// Greedy fill of `capacity` units, deuterium first, then crystal, then metal.
    #[must_use]
    pub fn fit_into(&self, capacity: u64) -> Resources {
        let mut left = capacity;
        let mut take = |amount: u64| {
            let taken = amount.min(left);
            left -= taken;
            taken
        };
        let deuterium = take(self.deuterium);
        let crystal = take(self.crystal);
        let metal = take(self.metal);
        Resources::new(metal, crystal, deuterium)
    }
}

/// Hourly production of each resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceRates {
    pub metal: f64,
    pub crystal: f64,
    pub deuterium: f64,
}

impl ResourceRates {
    /// Seconds until `stock` grows to cover `cost`; `None` if a missing
    /// resource is not produced at all.
    pub fn seconds_until(&self, stock: &Resources, cost: &Resources) -> Option<u64> {
        let missing = cost.saturating_sub(stock);
        let wait = |missing: u64, rate: f64| -> Option<f64> {
            if missing == 0 {
                Some(0.0)
            } else if rate > 0.0 {
                Some(missing as f64 / rate * 3600.0)
            } else {
                None
            }
        };
        let secs = wait(missing.metal, self.metal)?
            .max(wait(missing.crystal, self.crystal)?)
            .max(wait(missing.deuterium, self.deuterium)?);
        Some(secs.ceil() as u64)
    }
}

/// Trade ratio between resources, e.g. 3:2:1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRatio {
    pub metal: f64,
    pub crystal: f64,
    pub deuterium: f64,
}

impl Default for ExchangeRatio {
    fn default() -> Self {
        Self {
            metal: 2.5,
            crystal: 1.5,
            deuterium: 1.0,
        }
    }
}
