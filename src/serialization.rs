use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::expressions::AttributeValue;
use crate::modifiers::ModifierApplicationDef;

/// When a consumption capability draws its resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumeTrigger {
    /// Drawn every tick, scaled by tick duration. A failed draw marks the
    /// owner non-operational for that tick.
    #[default]
    Constant,
    /// A one-shot cost checked and paid when the owner activates.
    Activation,
}

/// One declared capability entry — the raw data fragment a capability
/// instance is built from and resynced against.
///
/// Every field is optional in content; kinds read the fields they care about
/// and ignore the rest. Scaling-prone bases are [`AttributeValue`]s so content
/// can write container-relative formulas for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityDef {
    pub name: Option<String>,
    pub resource: Option<String>,
    pub trigger: Option<ConsumeTrigger>,
    pub amount: AttributeValue,
    pub capacity: AttributeValue,
    pub rate: AttributeValue,
    pub regen: AttributeValue,
    pub thrust: AttributeValue,
    pub turn: AttributeValue,
    pub required: AttributeValue,
    pub damage: AttributeValue,
    pub range: f32,
    pub reload: f32,
    #[serde(default = "full_arc")]
    pub arc: f32,
    pub facing: f32,
    pub accuracy: f32,
    pub falloff: f32,
    pub speed: f32,
    pub endurance: f32,
    pub stealth: f32,
    pub hull: f32,
    pub attack: f32,
    pub defense: f32,
    pub flag: Option<String>,
    pub stack_group: Option<String>,
    pub tags: Vec<String>,
}

fn full_arc() -> f32 {
    360.0
}

impl Default for AbilityDef {
    fn default() -> Self {
        Self {
            name: None,
            resource: None,
            trigger: None,
            amount: AttributeValue::default(),
            capacity: AttributeValue::default(),
            rate: AttributeValue::default(),
            regen: AttributeValue::default(),
            thrust: AttributeValue::default(),
            turn: AttributeValue::default(),
            required: AttributeValue::default(),
            damage: AttributeValue::default(),
            range: 0.0,
            reload: 0.0,
            arc: full_arc(),
            facing: 0.0,
            accuracy: 0.0,
            falloff: 0.0,
            speed: 0.0,
            endurance: 0.0,
            stealth: 0.0,
            hull: 0.0,
            attack: 0.0,
            defense: 0.0,
            flag: None,
            stack_group: None,
            tags: Vec::new(),
        }
    }
}

/// A declared capability name maps to either a single entry or a list of
/// entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AbilityEntries {
    One(AbilityDef),
    Many(Vec<AbilityDef>),
}

impl AbilityEntries {
    pub fn iter(&self) -> impl Iterator<Item = &AbilityDef> {
        match self {
            AbilityEntries::One(def) => std::slice::from_ref(def).iter(),
            AbilityEntries::Many(defs) => defs.iter(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AbilityEntries::One(_) => 1,
            AbilityEntries::Many(defs) => defs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The raw structured declaration of one component.
///
/// Retained verbatim by the constructed component so recalculation can always
/// restart from source truth rather than from already-scaled values. Ability
/// declaration order is preserved — reconciliation consumes entries in the
/// order content wrote them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDef {
    /// Stable identity. Falls back to `name` when content leaves it empty.
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub component_type: String,
    #[serde(default)]
    pub size_class: String,
    #[serde(default)]
    pub mass: AttributeValue,
    #[serde(default)]
    pub hull: AttributeValue,
    #[serde(default = "default_threshold")]
    pub damage_threshold: f32,
    #[serde(default)]
    pub abilities: IndexMap<String, AbilityEntries>,
    #[serde(default)]
    pub modifiers: Vec<ModifierApplicationDef>,
}

fn default_threshold() -> f32 {
    0.5
}

impl ComponentDef {
    /// A minimal declaration with no abilities or modifiers.
    pub fn new(name: &str, component_type: &str, mass: f32, hull: f32) -> Self {
        Self {
            id: String::new(),
            name: name.to_string(),
            component_type: component_type.to_string(),
            size_class: String::new(),
            mass: AttributeValue::Literal(mass),
            hull: AttributeValue::Literal(hull),
            damage_threshold: default_threshold(),
            abilities: IndexMap::new(),
            modifiers: Vec::new(),
        }
    }

    /// Appends one ability entry under a declared name, creating or extending
    /// the entry list as needed.
    pub fn declare_ability(&mut self, declared_name: &str, def: AbilityDef) {
        match self.abilities.get_mut(declared_name) {
            Some(AbilityEntries::Many(defs)) => defs.push(def),
            Some(entries @ AbilityEntries::One(_)) => {
                let AbilityEntries::One(first) = entries.clone() else {
                    return;
                };
                *entries = AbilityEntries::Many(vec![first, def]);
            }
            None => {
                self.abilities
                    .insert(declared_name.to_string(), AbilityEntries::One(def));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_defs_parse_from_json() {
        let raw = r#"{
            "name": "Pulse Laser",
            "type": "weapon",
            "size_class": "small",
            "mass": 25.0,
            "hull": 40,
            "abilities": {
                "beam_weapon": { "damage": 8.0, "range": 5000.0, "reload": 2.0, "accuracy": 10.0, "falloff": 0.0001 },
                "energy_use": { "amount": 3.0, "trigger": "activation" }
            },
            "modifiers": [ { "modifier": "turret" } ]
        }"#;

        let def: ComponentDef = serde_json::from_str(raw).unwrap();
        assert_eq!(def.component_type, "weapon");
        assert_eq!(def.abilities.len(), 2);
        assert_eq!(def.modifiers.len(), 1);
        assert_eq!(def.modifiers[0].value, None);

        let beam = def.abilities.get("beam_weapon").unwrap();
        assert_eq!(beam.len(), 1);
        let entry = beam.iter().next().unwrap();
        assert_eq!(entry.range, 5000.0);
        assert_eq!(entry.arc, 360.0); // default
    }

    #[test]
    fn formula_attributes_survive_ingestion() {
        let raw = r#"{
            "name": "Crew Deck",
            "type": "quarters",
            "mass": "30 * math::sqrt(ship_mass / 1000)",
            "hull": 50
        }"#;

        let def: ComponentDef = serde_json::from_str(raw).unwrap();
        assert!(def.mass.is_formula());
        assert!(!def.hull.is_formula());
    }

    #[test]
    fn ability_lists_parse_as_many() {
        let raw = r#"{
            "name": "Twin Rack",
            "type": "weapon",
            "mass": 10,
            "hull": 10,
            "abilities": {
                "seeker_weapon": [ { "damage": 4.0 }, { "damage": 4.0 } ]
            }
        }"#;

        let def: ComponentDef = serde_json::from_str(raw).unwrap();
        assert_eq!(def.abilities.get("seeker_weapon").unwrap().len(), 2);
    }

    #[test]
    fn declare_ability_extends_existing_entries() {
        let mut def = ComponentDef::new("Bay", "hangar", 100.0, 200.0);
        def.declare_ability("launch_bay", AbilityDef::default());
        def.declare_ability("launch_bay", AbilityDef::default());
        assert_eq!(def.abilities.get("launch_bay").unwrap().len(), 2);
    }
}
