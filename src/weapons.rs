use serde::{Deserialize, Serialize};

use crate::expressions::EvalScope;
use crate::serialization::AbilityDef;
use crate::stats::{channel, StatSheet};

/// Concrete weapon behavior backing a declared weapon capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponClass {
    Beam,
    Projectile,
    Seeker,
}

/// The logistic hit-chance curve. There is no hard range cutoff: accuracy
/// degrades asymptotically with distance.
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// A weapon capability instance.
///
/// Base values are rebuilt from the declaration on every resync; working
/// values are derived from the bases and the owning component's stat sheet.
/// The cooldown timer is live state and rides through both untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    pub class: WeaponClass,

    base_damage: f32,
    base_range: f32,
    base_reload: f32,
    base_arc: f32,
    base_facing: f32,
    base_accuracy: f32,
    base_endurance: f32,
    base_stealth: f32,
    base_projectile_hull: f32,

    pub damage: f32,
    pub range: f32,
    pub reload: f32,
    pub arc: f32,
    pub facing: f32,
    pub accuracy: f32,
    pub falloff: f32,
    pub speed: f32,
    pub endurance: f32,
    pub stealth: f32,
    pub projectile_hull: f32,

    /// Seconds until the weapon can fire again.
    pub cooldown: f32,
}

impl Weapon {
    pub(crate) fn fresh(class: WeaponClass) -> Self {
        Self {
            class,
            base_damage: 0.0,
            base_range: 0.0,
            base_reload: 0.0,
            base_arc: 360.0,
            base_facing: 0.0,
            base_accuracy: 0.0,
            base_endurance: 0.0,
            base_stealth: 0.0,
            base_projectile_hull: 0.0,
            damage: 0.0,
            range: 0.0,
            reload: 0.0,
            arc: 360.0,
            facing: 0.0,
            accuracy: 0.0,
            falloff: 0.0,
            speed: 0.0,
            endurance: 0.0,
            stealth: 0.0,
            projectile_hull: 0.0,
            cooldown: 0.0,
        }
    }

    /// Rebuilds base values from a declaration fragment. Live state
    /// (cooldown) is preserved.
    pub(crate) fn resync(&mut self, def: &AbilityDef, scope: &EvalScope) {
        self.base_damage = def.damage.resolve(scope);
        self.base_range = def.range;
        self.base_reload = def.reload;
        self.base_arc = def.arc;
        self.base_facing = def.facing;
        self.base_accuracy = def.accuracy;
        self.falloff = def.falloff;
        self.speed = def.speed;
        self.base_endurance = def.endurance;
        self.base_stealth = def.stealth;
        self.base_projectile_hull = def.hull;
    }

    pub(crate) fn recalculate(&mut self, stats: &StatSheet) {
        self.damage = self.base_damage * stats.mult(channel::DAMAGE);
        if self.class == WeaponClass::Seeker {
            self.damage *= stats.mult(channel::PROJECTILE_DAMAGE);
        }
        self.range = self.base_range * stats.mult(channel::RANGE);
        self.reload = self.base_reload * stats.mult(channel::RELOAD);
        self.accuracy = self.base_accuracy + stats.offset(channel::ACCURACY);
        self.arc = stats
            .override_for(channel::ARC)
            .unwrap_or(self.base_arc + stats.offset(channel::ARC));
        self.facing = stats.override_for(channel::FACING).unwrap_or(self.base_facing);
        self.endurance = self.base_endurance * stats.mult(channel::ENDURANCE);
        self.stealth = self.base_stealth + stats.offset(channel::STEALTH);
        self.projectile_hull = self.base_projectile_hull * stats.mult(channel::PROJECTILE_HULL);
    }

    pub fn ready(&self) -> bool {
        self.cooldown <= 0.0
    }

    pub(crate) fn tick(&mut self, dt: f32) {
        self.cooldown = (self.cooldown - dt).max(0.0);
    }

    pub(crate) fn fire(&mut self) {
        self.cooldown = self.reload;
    }

    /// Probability of a beam hitting at `distance`.
    pub fn hit_chance(&self, distance: f32) -> f32 {
        sigmoid(self.accuracy - self.falloff * distance)
    }

    pub(crate) fn summary(&self) -> Vec<(String, String)> {
        let mut rows = vec![
            ("Damage".to_string(), format!("{:.1}", self.damage)),
            ("Range".to_string(), format!("{:.0}", self.range)),
            ("Reload".to_string(), format!("{:.2}s", self.reload)),
            ("Arc".to_string(), format!("{:.0}°", self.arc)),
        ];
        match self.class {
            WeaponClass::Beam => {
                rows.push(("Accuracy".to_string(), format!("{:.1}", self.accuracy)));
            }
            WeaponClass::Projectile => {
                rows.push(("Speed".to_string(), format!("{:.0}", self.speed)));
            }
            WeaponClass::Seeker => {
                rows.push(("Endurance".to_string(), format!("{:.1}s", self.endurance)));
                if self.stealth > 0.0 {
                    rows.push(("Stealth".to_string(), format!("{:.0}", self.stealth)));
                }
            }
        }
        rows
    }
}
