use std::collections::HashMap;

use crate::expressions::EvalScope;
use crate::registry::AbilityAlias;
use crate::serialization::{AbilityDef, ConsumeTrigger};
use crate::stats::{channel, StatSheet};
use crate::weapons::{Weapon, WeaponClass};

/// Named resource store the owning container exposes to per-tick updates and
/// activations.
#[derive(Debug, Clone, Default)]
pub struct ResourcePool {
    amounts: HashMap<String, f32>,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deposit(&mut self, resource: &str, amount: f32) {
        let entry = self.amounts.entry(resource.to_string()).or_insert(0.0);
        *entry += amount;
    }

    pub fn available(&self, resource: &str) -> f32 {
        self.amounts.get(resource).copied().unwrap_or(0.0)
    }

    pub fn can_draw(&self, resource: &str, amount: f32) -> bool {
        self.available(resource) >= amount
    }

    /// Draws `amount` if available. Returns false and leaves the pool
    /// untouched when the resource cannot cover the draw.
    pub fn draw(&mut self, resource: &str, amount: f32) -> bool {
        let Some(current) = self.amounts.get_mut(resource) else {
            return amount <= 0.0;
        };
        if *current < amount {
            return false;
        }
        *current -= amount;
        true
    }
}

/// Concrete kind identity used by reconciliation and aggregation.
///
/// Aliased declarations collapse onto these: a fuel tank and a battery are
/// both `Storage`, parameterized by resource name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbilityKindId {
    Storage,
    Consumer,
    Generator,
    Thruster,
    Turning,
    Shield,
    BeamWeapon,
    ProjectileWeapon,
    SeekerWeapon,
    LaunchBay,
    CrewQuarters,
    CrewRequirement,
    Targeting,
    Marker,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Storage {
    pub resource: String,
    base_capacity: f32,
    pub capacity: f32,
    /// Currently stored amount. Live state: survives resync and rescale.
    pub amount: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Consumer {
    pub resource: String,
    pub trigger: ConsumeTrigger,
    base_amount: f32,
    /// Per-second draw for constant triggers, per-activation cost otherwise.
    pub amount: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generator {
    pub resource: String,
    base_rate: f32,
    pub rate: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Thruster {
    base_thrust: f32,
    pub thrust: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Turning {
    base_turn: f32,
    pub turn: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shield {
    base_capacity: f32,
    pub capacity: f32,
    base_regen: f32,
    pub regen: f32,
    /// Current charge. Live state.
    pub charge: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaunchBay {
    base_capacity: f32,
    pub capacity: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrewQuarters {
    base_capacity: f32,
    pub capacity: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrewRequirement {
    base_required: f32,
    pub required: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Targeting {
    base_attack: f32,
    pub attack: f32,
    base_defense: f32,
    pub defense: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Marker {
    pub flag: String,
}

/// Closed set of concrete capability behaviors. Reconciliation and
/// aggregation switch exhaustively on this.
#[derive(Debug, Clone, PartialEq)]
pub enum AbilityKind {
    Storage(Storage),
    Consumer(Consumer),
    Generator(Generator),
    Thruster(Thruster),
    Turning(Turning),
    Shield(Shield),
    Weapon(Weapon),
    LaunchBay(LaunchBay),
    CrewQuarters(CrewQuarters),
    CrewRequirement(CrewRequirement),
    Targeting(Targeting),
    Marker(Marker),
}

/// A live capability instance owned by a component.
#[derive(Debug, Clone, PartialEq)]
pub struct Ability {
    pub tags: Vec<String>,
    pub stack_group: Option<String>,
    def: AbilityDef,
    pub kind: AbilityKind,
}

impl Ability {
    /// A blank instance of a concrete kind, waiting for its first resync.
    pub(crate) fn fresh(kind_id: AbilityKindId) -> Self {
        let kind = match kind_id {
            AbilityKindId::Storage => AbilityKind::Storage(Storage::default()),
            AbilityKindId::Consumer => AbilityKind::Consumer(Consumer::default()),
            AbilityKindId::Generator => AbilityKind::Generator(Generator::default()),
            AbilityKindId::Thruster => AbilityKind::Thruster(Thruster::default()),
            AbilityKindId::Turning => AbilityKind::Turning(Turning::default()),
            AbilityKindId::Shield => AbilityKind::Shield(Shield::default()),
            AbilityKindId::BeamWeapon => AbilityKind::Weapon(Weapon::fresh(WeaponClass::Beam)),
            AbilityKindId::ProjectileWeapon => {
                AbilityKind::Weapon(Weapon::fresh(WeaponClass::Projectile))
            }
            AbilityKindId::SeekerWeapon => AbilityKind::Weapon(Weapon::fresh(WeaponClass::Seeker)),
            AbilityKindId::LaunchBay => AbilityKind::LaunchBay(LaunchBay::default()),
            AbilityKindId::CrewQuarters => AbilityKind::CrewQuarters(CrewQuarters::default()),
            AbilityKindId::CrewRequirement => {
                AbilityKind::CrewRequirement(CrewRequirement::default())
            }
            AbilityKindId::Targeting => AbilityKind::Targeting(Targeting::default()),
            AbilityKindId::Marker => AbilityKind::Marker(Marker::default()),
        };
        Self {
            tags: Vec::new(),
            stack_group: None,
            def: AbilityDef::default(),
            kind,
        }
    }

    pub fn kind_id(&self) -> AbilityKindId {
        match &self.kind {
            AbilityKind::Storage(_) => AbilityKindId::Storage,
            AbilityKind::Consumer(_) => AbilityKindId::Consumer,
            AbilityKind::Generator(_) => AbilityKindId::Generator,
            AbilityKind::Thruster(_) => AbilityKindId::Thruster,
            AbilityKind::Turning(_) => AbilityKindId::Turning,
            AbilityKind::Shield(_) => AbilityKindId::Shield,
            AbilityKind::Weapon(weapon) => match weapon.class {
                WeaponClass::Beam => AbilityKindId::BeamWeapon,
                WeaponClass::Projectile => AbilityKindId::ProjectileWeapon,
                WeaponClass::Seeker => AbilityKindId::SeekerWeapon,
            },
            AbilityKind::LaunchBay(_) => AbilityKindId::LaunchBay,
            AbilityKind::CrewQuarters(_) => AbilityKindId::CrewQuarters,
            AbilityKind::CrewRequirement(_) => AbilityKindId::CrewRequirement,
            AbilityKind::Targeting(_) => AbilityKindId::Targeting,
            AbilityKind::Marker(_) => AbilityKindId::Marker,
        }
    }

    /// The raw declaration fragment this instance was last resynced from.
    pub fn def(&self) -> &AbilityDef {
        &self.def
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Rebuilds declared bases from a (possibly new) declaration fragment.
    /// Live state — stored amounts, shield charge, weapon cooldowns — is
    /// preserved.
    pub(crate) fn resync(&mut self, alias: &AbilityAlias, def: &AbilityDef, scope: &EvalScope) {
        self.tags = def.tags.clone();
        self.stack_group = def.stack_group.clone();
        self.def = def.clone();

        let aliased_resource = alias
            .resource
            .clone()
            .or_else(|| def.resource.clone())
            .unwrap_or_default();

        match &mut self.kind {
            AbilityKind::Storage(storage) => {
                storage.resource = aliased_resource;
                storage.base_capacity = def.capacity.resolve(scope);
            }
            AbilityKind::Consumer(consumer) => {
                consumer.resource = aliased_resource;
                consumer.trigger = alias.trigger.or(def.trigger).unwrap_or_default();
                consumer.base_amount = def.amount.resolve(scope);
            }
            AbilityKind::Generator(generator) => {
                generator.resource = aliased_resource;
                generator.base_rate = def.rate.resolve(scope);
            }
            AbilityKind::Thruster(thruster) => {
                thruster.base_thrust = def.thrust.resolve(scope);
            }
            AbilityKind::Turning(turning) => {
                turning.base_turn = def.turn.resolve(scope);
            }
            AbilityKind::Shield(shield) => {
                shield.base_capacity = def.capacity.resolve(scope);
                shield.base_regen = def.regen.resolve(scope);
            }
            AbilityKind::Weapon(weapon) => {
                weapon.resync(def, scope);
            }
            AbilityKind::LaunchBay(bay) => {
                bay.base_capacity = def.capacity.resolve(scope);
            }
            AbilityKind::CrewQuarters(quarters) => {
                quarters.base_capacity = def.capacity.resolve(scope);
            }
            AbilityKind::CrewRequirement(requirement) => {
                requirement.base_required = def.required.resolve(scope);
            }
            AbilityKind::Targeting(targeting) => {
                targeting.base_attack = def.attack;
                targeting.base_defense = def.defense;
            }
            AbilityKind::Marker(marker) => {
                marker.flag = def
                    .flag
                    .clone()
                    .or_else(|| def.name.clone())
                    .unwrap_or_default();
            }
        }
    }

    /// Kind-specific resync from the stat sheet.
    pub(crate) fn recalculate(&mut self, stats: &StatSheet) {
        match &mut self.kind {
            AbilityKind::Thruster(thruster) => {
                thruster.thrust = thruster.base_thrust * stats.mult(channel::THRUST);
            }
            AbilityKind::Turning(turning) => {
                turning.turn = turning.base_turn * stats.mult(channel::TURN);
            }
            AbilityKind::Shield(shield) => {
                let old_capacity = shield.capacity;
                shield.capacity = shield.base_capacity * stats.mult(channel::SHIELD);
                shield.regen = shield.base_regen * stats.mult(channel::SHIELD);
                shield.charge = rescaled_store(shield.charge, old_capacity, shield.capacity);
            }
            AbilityKind::Weapon(weapon) => {
                weapon.recalculate(stats);
            }
            AbilityKind::LaunchBay(bay) => {
                bay.capacity = bay.base_capacity;
            }
            AbilityKind::CrewQuarters(quarters) => {
                quarters.capacity = quarters.base_capacity;
            }
            AbilityKind::CrewRequirement(requirement) => {
                requirement.required = requirement.base_required * stats.mult(channel::CREW);
            }
            AbilityKind::Targeting(targeting) => {
                targeting.attack = targeting.base_attack + stats.offset(channel::ACCURACY);
                targeting.defense = targeting.base_defense;
            }
            // Resource-bearing kinds are rescaled in resource_resync
            AbilityKind::Storage(_) | AbilityKind::Consumer(_) | AbilityKind::Generator(_) => {}
            AbilityKind::Marker(_) => {}
        }
    }

    /// Generic second resync phase: resource-bearing kinds rescale their
    /// working values from their own declared base times the resource
    /// channel. New resource kinds slot in here without touching the
    /// pipeline.
    pub(crate) fn resource_resync(&mut self, stats: &StatSheet) {
        let scale = stats.mult(channel::RESOURCE);
        match &mut self.kind {
            AbilityKind::Storage(storage) => {
                let old_capacity = storage.capacity;
                storage.capacity = storage.base_capacity * scale;
                storage.amount = rescaled_store(storage.amount, old_capacity, storage.capacity);
            }
            AbilityKind::Consumer(consumer) => {
                consumer.amount = consumer.base_amount * scale;
            }
            AbilityKind::Generator(generator) => {
                generator.rate = generator.base_rate * scale;
            }
            _ => {}
        }
    }

    /// Advances timers and constant consumption by `dt` seconds. Returns
    /// false when a constant draw could not be covered — the owner is
    /// non-operational for this tick.
    pub(crate) fn tick(&mut self, dt: f32, pool: &mut ResourcePool) -> bool {
        match &mut self.kind {
            AbilityKind::Consumer(consumer) => match consumer.trigger {
                ConsumeTrigger::Constant => pool.draw(&consumer.resource, consumer.amount * dt),
                ConsumeTrigger::Activation => true,
            },
            AbilityKind::Generator(generator) => {
                pool.deposit(&generator.resource, generator.rate * dt);
                true
            }
            AbilityKind::Weapon(weapon) => {
                weapon.tick(dt);
                true
            }
            AbilityKind::Shield(shield) => {
                shield.charge = (shield.charge + shield.regen * dt).min(shield.capacity);
                true
            }
            _ => true,
        }
    }

    /// Whether this instance would let an activation through right now.
    pub fn can_activate(&self, pool: &ResourcePool) -> bool {
        match &self.kind {
            AbilityKind::Consumer(consumer) => match consumer.trigger {
                ConsumeTrigger::Activation => pool.can_draw(&consumer.resource, consumer.amount),
                ConsumeTrigger::Constant => true,
            },
            AbilityKind::Weapon(weapon) => weapon.ready(),
            _ => true,
        }
    }

    /// Pays activation costs / starts cooldowns. Callers check
    /// `can_activate` across the whole component first.
    pub(crate) fn activate(&mut self, pool: &mut ResourcePool) -> bool {
        match &mut self.kind {
            AbilityKind::Consumer(consumer) => match consumer.trigger {
                ConsumeTrigger::Activation => pool.draw(&consumer.resource, consumer.amount),
                ConsumeTrigger::Constant => true,
            },
            AbilityKind::Weapon(weapon) => {
                if !weapon.ready() {
                    return false;
                }
                weapon.fire();
                true
            }
            _ => true,
        }
    }

    /// Displayable rows for UI consumers.
    pub fn summary(&self) -> Vec<(String, String)> {
        match &self.kind {
            AbilityKind::Storage(storage) => vec![
                (format!("{} storage", storage.resource), format!("{:.0}", storage.capacity)),
                ("Stored".to_string(), format!("{:.0}", storage.amount)),
            ],
            AbilityKind::Consumer(consumer) => {
                let label = match consumer.trigger {
                    ConsumeTrigger::Constant => format!("{} /s", consumer.resource),
                    ConsumeTrigger::Activation => format!("{} /use", consumer.resource),
                };
                vec![(label, format!("{:.1}", consumer.amount))]
            }
            AbilityKind::Generator(generator) => {
                vec![(format!("{} /s", generator.resource), format!("{:.1}", generator.rate))]
            }
            AbilityKind::Thruster(thruster) => {
                vec![("Thrust".to_string(), format!("{:.0}", thruster.thrust))]
            }
            AbilityKind::Turning(turning) => {
                vec![("Turn rate".to_string(), format!("{:.1}", turning.turn))]
            }
            AbilityKind::Shield(shield) => vec![
                ("Shield".to_string(), format!("{:.0}", shield.capacity)),
                ("Regen".to_string(), format!("{:.1}/s", shield.regen)),
            ],
            AbilityKind::Weapon(weapon) => weapon.summary(),
            AbilityKind::LaunchBay(bay) => {
                vec![("Bay capacity".to_string(), format!("{:.0}", bay.capacity))]
            }
            AbilityKind::CrewQuarters(quarters) => {
                vec![("Crew capacity".to_string(), format!("{:.0}", quarters.capacity))]
            }
            AbilityKind::CrewRequirement(requirement) => {
                vec![("Crew required".to_string(), format!("{:.1}", requirement.required))]
            }
            AbilityKind::Targeting(targeting) => vec![
                ("Attack rating".to_string(), format!("{:.1}", targeting.attack)),
                ("Defense rating".to_string(), format!("{:.1}", targeting.defense)),
            ],
            AbilityKind::Marker(marker) => vec![("Flag".to_string(), marker.flag.clone())],
        }
    }
}

/// Refill rule shared by stored quantities: a store that was empty-by-birth
/// (zero capacity) or full refills to the new capacity; anything else keeps
/// its consumed state, clamped.
fn rescaled_store(current: f32, old_capacity: f32, new_capacity: f32) -> f32 {
    if old_capacity == 0.0 || current == old_capacity {
        new_capacity
    } else {
        current.clamp(0.0, new_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_draw_is_all_or_nothing() {
        let mut pool = ResourcePool::new();
        pool.deposit("fuel", 10.0);
        assert!(pool.draw("fuel", 4.0));
        assert_eq!(pool.available("fuel"), 6.0);
        assert!(!pool.draw("fuel", 7.0));
        assert_eq!(pool.available("fuel"), 6.0);
        assert!(!pool.draw("ammo", 1.0));
        assert!(pool.draw("ammo", 0.0));
    }

    #[test]
    fn fresh_store_fills_and_partial_store_clamps() {
        // New instance: capacity goes 0 -> 100, fills
        assert_eq!(rescaled_store(0.0, 0.0, 100.0), 100.0);
        // Full store follows capacity up
        assert_eq!(rescaled_store(100.0, 100.0, 200.0), 200.0);
        // Partially consumed store keeps its amount
        assert_eq!(rescaled_store(60.0, 100.0, 200.0), 60.0);
        // And clamps when capacity shrinks below it
        assert_eq!(rescaled_store(60.0, 100.0, 50.0), 50.0);
    }
}
