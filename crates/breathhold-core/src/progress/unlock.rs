use serde::{Deserialize, Serialize};

/// Features gated behind a daily streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnlockFeature {
    TheVault,
    BoxBreathing,
    MultiHold,
    DeepDive,
}

impl UnlockFeature {
    pub const ALL: [UnlockFeature; 4] = [
        UnlockFeature::TheVault,
        UnlockFeature::BoxBreathing,
        UnlockFeature::MultiHold,
        UnlockFeature::DeepDive,
    ];

    /// Consecutive days needed to unlock.
    pub fn required_streak(self) -> u32 {
        match self {
            UnlockFeature::TheVault => 1,
            UnlockFeature::BoxBreathing => 3,
            UnlockFeature::MultiHold => 7,
            UnlockFeature::DeepDive => 14,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            UnlockFeature::TheVault => "The Vault",
            UnlockFeature::BoxBreathing => "Box Breathing",
            UnlockFeature::MultiHold => "Multi-Hold",
            UnlockFeature::DeepDive => "Deep Dive",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            UnlockFeature::TheVault => "Your history of every recorded hold",
            UnlockFeature::BoxBreathing => "Equal-count breathing with a mid-cycle hold",
            UnlockFeature::MultiHold => "Extended holds between breaths",
            UnlockFeature::DeepDive => "Personal trend charts across all sessions",
        }
    }

    /// Every feature whose threshold is met by `streak`.
    pub fn earned_at(streak: u32) -> impl Iterator<Item = UnlockFeature> {
        Self::ALL
            .into_iter()
            .filter(move |f| f.required_streak() <= streak)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vault_needs_one_day() {
        let earned: Vec<_> = UnlockFeature::earned_at(1).collect();
        assert_eq!(earned, vec![UnlockFeature::TheVault]);
    }

    #[test]
    fn nothing_at_zero() {
        assert_eq!(UnlockFeature::earned_at(0).count(), 0);
    }

    #[test]
    fn serializes_camel_case() {
        assert_eq!(serde_json::to_string(&UnlockFeature::TheVault).unwrap(), "\"theVault\"");
    }
}
