use std::collections::HashMap;

use crate::abilities::AbilityKindId;
use crate::modifiers::ModifierDef;
use crate::serialization::{ComponentDef, ConsumeTrigger};

/// One alias-table entry: the canonical concrete kind a declared name
/// resolves to, plus parameters the shorthand primes (resource name, consume
/// trigger). Declared data wins only where the alias leaves a parameter
/// unset.
#[derive(Debug, Clone, PartialEq)]
pub struct AbilityAlias {
    pub kind: AbilityKindId,
    pub resource: Option<String>,
    pub trigger: Option<ConsumeTrigger>,
}

impl AbilityAlias {
    pub fn plain(kind: AbilityKindId) -> Self {
        Self { kind, resource: None, trigger: None }
    }

    pub fn primed(kind: AbilityKindId, resource: &str, trigger: Option<ConsumeTrigger>) -> Self {
        Self {
            kind,
            resource: Some(resource.to_string()),
            trigger,
        }
    }
}

/// The externally-owned content registry.
///
/// Holds the modifier definition table, the ability alias table, and the
/// component templates the loader ingested. It is passed by reference into
/// every component operation — there is no ambient global — and content
/// reload swaps the tables wholesale via [`Registry::reload`]. Reloading
/// while a recalculation is in flight is a caller contract violation.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    modifiers: HashMap<String, ModifierDef>,
    aliases: HashMap<String, AbilityAlias>,
    templates: HashMap<String, ComponentDef>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry seeded with the canonical ability names and the standard
    /// shorthand aliases. Content packs extend it from there.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        for (name, kind) in [
            ("storage", AbilityKindId::Storage),
            ("consumer", AbilityKindId::Consumer),
            ("generator", AbilityKindId::Generator),
            ("thruster", AbilityKindId::Thruster),
            ("turning", AbilityKindId::Turning),
            ("shield", AbilityKindId::Shield),
            ("beam_weapon", AbilityKindId::BeamWeapon),
            ("projectile_weapon", AbilityKindId::ProjectileWeapon),
            ("seeker_weapon", AbilityKindId::SeekerWeapon),
            ("launch_bay", AbilityKindId::LaunchBay),
            ("crew_quarters", AbilityKindId::CrewQuarters),
            ("crew_requirement", AbilityKindId::CrewRequirement),
            ("targeting", AbilityKindId::Targeting),
            ("marker", AbilityKindId::Marker),
        ] {
            registry.register_alias(name, AbilityAlias::plain(kind));
        }

        for (name, kind, resource, trigger) in [
            ("fuel_tank", AbilityKindId::Storage, "fuel", None),
            ("battery", AbilityKindId::Storage, "energy", None),
            ("magazine", AbilityKindId::Storage, "ammo", None),
            ("fuel_use", AbilityKindId::Consumer, "fuel", Some(ConsumeTrigger::Constant)),
            ("energy_use", AbilityKindId::Consumer, "energy", Some(ConsumeTrigger::Activation)),
            ("ammo_use", AbilityKindId::Consumer, "ammo", Some(ConsumeTrigger::Activation)),
            ("reactor", AbilityKindId::Generator, "energy", None),
        ] {
            registry.register_alias(name, AbilityAlias::primed(kind, resource, trigger));
        }

        registry
    }

    /// Register a modifier definition under its own id.
    pub fn register_modifier(&mut self, def: ModifierDef) {
        self.modifiers.insert(def.id.clone(), def);
    }

    pub fn modifier(&self, id: &str) -> Option<&ModifierDef> {
        self.modifiers.get(id)
    }

    /// Register an alias for a declared ability name.
    pub fn register_alias(&mut self, name: &str, alias: AbilityAlias) {
        self.aliases.insert(name.to_string(), alias);
    }

    /// Resolve a declared ability name to its concrete kind.
    pub fn resolve(&self, name: &str) -> Option<&AbilityAlias> {
        self.aliases.get(name)
    }

    /// Register a component template under its name.
    pub fn register_template(&mut self, def: ComponentDef) {
        self.templates.insert(def.name.clone(), def);
    }

    pub fn template(&self, name: &str) -> Option<&ComponentDef> {
        self.templates.get(name)
    }

    /// Swap all tables wholesale. Stop-the-world relative to any in-flight
    /// recalculation.
    pub fn reload(&mut self, other: Registry) {
        *self = other;
    }
}
