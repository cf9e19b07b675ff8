use serde::{Deserialize, Serialize};

pub const FREE_MASK_LIMIT: usize = 5;
pub const PREMIUM_MASK_LIMIT: usize = 1000;

/// Purchase tier. Purchasing itself happens outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Premium,
}

/// Supplies the per-card mask ceiling.
pub trait EntitlementProvider {
    fn mask_limit(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entitlement {
    tier: Tier,
    free_limit: usize,
    premium_limit: usize,
}

impl Entitlement {
    pub const fn new(tier: Tier) -> Self {
        Self {
            tier,
            free_limit: FREE_MASK_LIMIT,
            premium_limit: PREMIUM_MASK_LIMIT,
        }
    }

    pub const fn with_limits(tier: Tier, free_limit: usize, premium_limit: usize) -> Self {
        Self {
            tier,
            free_limit,
            premium_limit,
        }
    }

    pub const fn tier(&self) -> Tier {
        self.tier
    }

    pub fn set_tier(&mut self, tier: Tier) {
        self.tier = tier;
    }

    pub const fn is_premium(&self) -> bool {
        matches!(self.tier, Tier::Premium)
    }
}

impl Default for Entitlement {
    fn default() -> Self {
        Self::new(Tier::Free)
    }
}

impl EntitlementProvider for Entitlement {
    fn mask_limit(&self) -> usize {
        match self.tier {
            Tier::Free => self.free_limit,
            Tier::Premium => self.premium_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_follow_tier() {
        assert_eq!(Entitlement::new(Tier::Free).mask_limit(), 5);
        assert_eq!(Entitlement::new(Tier::Premium).mask_limit(), 1000);
        assert!(!Entitlement::default().is_premium());
    }

    #[test]
    fn upgrading_tier_raises_limit() {
        let mut entitlement = Entitlement::with_limits(Tier::Free, 2, 50);
        assert_eq!(entitlement.mask_limit(), 2);
        entitlement.set_tier(Tier::Premium);
        assert!(entitlement.is_premium());
        assert_eq!(entitlement.mask_limit(), 50);
    }

    #[test]
    fn tier_parses_lowercase_names() {
        let tier: Tier = serde_json::from_str("\"premium\"").expect("tier should parse");
        assert_eq!(tier, Tier::Premium);
        assert!(serde_json::from_str::<Tier>("\"gold\"").is_err());
    }
}
