use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::stats::{channel, StatSheet};

/// The effect descriptor set of one modifier definition.
///
/// Plain `scales` entries multiply their channel by `(1 + delta)`; `adds`
/// entries accumulate on a channel's offset; `sets` entries install a hard
/// override where the last applied wins. A `special` entry names one of the
/// non-linear strategies, fed by the application's chosen value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectSet {
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub scales: HashMap<String, f32>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub adds: HashMap<String, f32>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub sets: HashMap<String, f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special: Option<SpecialEffect>,
}

impl EffectSet {
    /// Folds this descriptor set into the accumulator. `value` is the
    /// application's chosen value and only feeds the special strategy; plain
    /// deltas are fixed by the definition.
    pub fn apply(&self, value: f32, stats: &mut StatSheet) {
        for (name, delta) in self.scales.iter() {
            stats.mul(name, 1.0 + delta);
        }
        for (name, amount) in self.adds.iter() {
            stats.add(name, *amount);
        }
        for (name, forced) in self.sets.iter() {
            stats.set_override(name, *forced);
        }
        if let Some(special) = self.special {
            special.apply(value, stats);
        }
    }
}

/// Named non-linear scaling strategies.
///
/// Each strategy is a pure function of (value, accumulator): it reads and
/// writes nothing outside the sheet. The curves are load-bearing for game
/// balance; changing any constant changes every fitted ship in the fleet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialEffect {
    SimpleSize,
    RangeMount,
    TurretMount,
    PrecisionMount,
    RapidFire,
    SeekerEndurance,
    SeekerDamage,
    SeekerArmored,
    SeekerStealth,
    Automation,
}

impl SpecialEffect {
    pub fn apply(self, value: f32, stats: &mut StatSheet) {
        match self {
            SpecialEffect::SimpleSize => {
                for name in [
                    channel::MASS,
                    channel::HULL,
                    channel::DAMAGE,
                    channel::COST,
                    channel::THRUST,
                    channel::TURN,
                    channel::RESOURCE,
                ] {
                    stats.mul(name, value);
                }
            }
            SpecialEffect::RangeMount => {
                // Cost is not scaled by range mounts.
                stats.mul(channel::RANGE, 2.0_f32.powf(value));
                stats.mul(channel::MASS, 3.5_f32.powf(value));
                stats.mul(channel::HULL, 3.5_f32.powf(value));
            }
            SpecialEffect::TurretMount => {
                stats.mul(channel::MASS, 1.0 + 0.514 * (1.0 + value / 30.0).ln());
                if value > 0.0 {
                    stats.set_override(channel::ARC, value);
                }
            }
            SpecialEffect::PrecisionMount => {
                stats.add(channel::ACCURACY, 0.5 * value);
                stats.mul(channel::MASS, 1.0 + 0.5 * value);
            }
            SpecialEffect::RapidFire => {
                let rate = value.max(1.0);
                stats.mul(channel::RELOAD, 1.0 / rate);
                stats.add_mult(channel::MASS, 2.0 * (rate - 1.0));
            }
            SpecialEffect::SeekerEndurance => {
                stats.mul(channel::ENDURANCE, value);
                stats.mul(channel::MASS, 1.0 + 0.5 * (value - 1.0));
            }
            SpecialEffect::SeekerDamage => {
                stats.mul(channel::PROJECTILE_DAMAGE, value);
                stats.mul(channel::MASS, 1.0 + 0.75 * (value - 1.0));
            }
            SpecialEffect::SeekerArmored => {
                stats.mul(channel::PROJECTILE_HULL, value);
                stats.mul(channel::MASS, 1.0 + 0.75 * (value - 1.0));
            }
            SpecialEffect::SeekerStealth => {
                stats.add(channel::STEALTH, value);
                stats.mul(channel::MASS, 1.0 + 2.0 * value);
            }
            SpecialEffect::Automation => {
                let reduction = value.clamp(0.0, 0.99);
                stats.mul(channel::CREW, 1.0 - reduction);
                stats.mul(channel::MASS, 1.0 + reduction);
            }
        }
    }
}
