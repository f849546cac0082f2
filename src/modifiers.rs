use serde::{Deserialize, Serialize};

use crate::effects::EffectSet;

/// Stacking semantics of a modifier definition: a toggle is either present or
/// absent, a scaled modifier carries a value from its permitted range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKind {
    #[default]
    Toggle,
    Scaled,
}

/// A named, reusable modifier spec.
///
/// Definitions live in the [`Registry`](crate::registry::Registry) and are
/// referenced by id from applications. Distinct definitions accumulate
/// multiplicatively on shared channels; re-applying the same id replaces the
/// previous application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: ModifierKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub effects: EffectSet,
    /// Component types this modifier may be applied to. Empty means any.
    #[serde(default)]
    pub allowed_types: Vec<String>,
    /// Component types this modifier may never be applied to. Deny wins.
    #[serde(default)]
    pub denied_types: Vec<String>,
    #[serde(default = "one")]
    pub min_value: f32,
    #[serde(default = "one")]
    pub max_value: f32,
    #[serde(default = "one")]
    pub default_value: f32,
    #[serde(default)]
    pub read_only: bool,
}

fn one() -> f32 {
    1.0
}

impl ModifierDef {
    /// Checked at apply-time, not at recalculation-time.
    pub fn allows(&self, component_type: &str) -> bool {
        if self.denied_types.iter().any(|t| t == component_type) {
            return false;
        }
        self.allowed_types.is_empty() || self.allowed_types.iter().any(|t| t == component_type)
    }

    /// Clamps an application value into the permitted range. Read-only
    /// definitions always use their default.
    pub fn clamp_value(&self, value: f32) -> f32 {
        if self.read_only {
            return self.default_value;
        }
        value.clamp(self.min_value, self.max_value)
    }
}

/// One definition applied to one component with a concrete value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierApplication {
    pub modifier: String,
    pub value: f32,
}

impl ModifierApplication {
    pub fn new(modifier: &str, value: f32) -> Self {
        Self { modifier: modifier.to_string(), value }
    }
}

/// An application as written in a component declaration, where the value is
/// optional and falls back to the definition default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierApplicationDef {
    pub modifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def_with_restrictions(allowed: &[&str], denied: &[&str]) -> ModifierDef {
        ModifierDef {
            id: "m".to_string(),
            name: "M".to_string(),
            kind: ModifierKind::Scaled,
            description: String::new(),
            effects: EffectSet::default(),
            allowed_types: allowed.iter().map(|s| s.to_string()).collect(),
            denied_types: denied.iter().map(|s| s.to_string()).collect(),
            min_value: 1.0,
            max_value: 4.0,
            default_value: 2.0,
            read_only: false,
        }
    }

    #[test]
    fn empty_allow_list_permits_any_type() {
        let def = def_with_restrictions(&[], &[]);
        assert!(def.allows("weapon"));
        assert!(def.allows("engine"));
    }

    #[test]
    fn deny_wins_over_allow() {
        let def = def_with_restrictions(&["weapon"], &["weapon"]);
        assert!(!def.allows("weapon"));
    }

    #[test]
    fn values_clamp_to_the_permitted_range() {
        let def = def_with_restrictions(&[], &[]);
        assert_eq!(def.clamp_value(0.5), 1.0);
        assert_eq!(def.clamp_value(10.0), 4.0);
        assert_eq!(def.clamp_value(3.0), 3.0);
    }

    #[test]
    fn read_only_definitions_pin_their_default() {
        let mut def = def_with_restrictions(&[], &[]);
        def.read_only = true;
        assert_eq!(def.clamp_value(3.0), 2.0);
    }
}
