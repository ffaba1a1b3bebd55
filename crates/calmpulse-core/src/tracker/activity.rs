use rand::Rng;
use serde::{Deserialize, Serialize};

/// Immutable catalog of things to do on a break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakActivity {
    EyeRest,
    Stretch,
    Walk,
    Hydrate,
}

impl BreakActivity {
    pub const CATALOG: [BreakActivity; 4] = [
        BreakActivity::EyeRest,
        BreakActivity::Stretch,
        BreakActivity::Walk,
        BreakActivity::Hydrate,
    ];

    pub fn kind(self) -> &'static str {
        match self {
            BreakActivity::EyeRest => "eye",
            BreakActivity::Stretch => "stretch",
            BreakActivity::Walk => "walk",
            BreakActivity::Hydrate => "water",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            BreakActivity::EyeRest => "20-20-20 Rule: Look 20ft away for 20s",
            BreakActivity::Stretch => "Shoulder rolls and neck stretches",
            BreakActivity::Walk => "Take a short walk",
            BreakActivity::Hydrate => "Drink water and stand up",
        }
    }

    pub fn suggested_duration_secs(self) -> u64 {
        match self {
            BreakActivity::EyeRest => 20,
            BreakActivity::Stretch => 60,
            BreakActivity::Walk => 300,
            BreakActivity::Hydrate => 30,
        }
    }

    /// Uniform pick from [`BreakActivity::CATALOG`].
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::CATALOG[rng.gen_range(0..Self::CATALOG.len())]
    }
}
