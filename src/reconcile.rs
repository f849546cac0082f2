use std::collections::{HashMap, VecDeque};

use indexmap::IndexMap;

use crate::abilities::{Ability, AbilityKindId};
use crate::expressions::EvalScope;
use crate::registry::Registry;
use crate::serialization::AbilityEntries;

/// Matches a new snapshot of capability declarations against the existing
/// live instances.
///
/// Two passes: index the existing instances by concrete kind (preserving
/// their relative order), then walk the declared entries in declaration
/// order, consuming one pooled instance of the matching kind per entry or
/// constructing a fresh one. Consumed instances are resynced with the new
/// entry data; their live state (cooldowns, stored amounts) rides through.
/// Instances left unconsumed are discarded.
///
/// Matching is by kind identity, not declared name — a fuel tank entry can
/// adopt an instance that was declared as a battery, because both are the
/// generic storage kind. This keeps "add one more module of a kind I already
/// have" cheap and non-disruptive.
pub fn reconcile_abilities(
    existing: Vec<Ability>,
    declared: &IndexMap<String, AbilityEntries>,
    registry: &Registry,
    scope: &EvalScope,
) -> Vec<Ability> {
    let mut pool: HashMap<AbilityKindId, VecDeque<Ability>> = HashMap::new();
    for ability in existing {
        pool.entry(ability.kind_id()).or_default().push_back(ability);
    }

    let mut next = Vec::new();
    for (declared_name, entries) in declared.iter() {
        let Some(alias) = registry.resolve(declared_name) else {
            log::warn!(
                "{}",
                crate::error::FitError::UnknownAbility { name: declared_name.clone() }
            );
            continue;
        };

        for def in entries.iter() {
            let mut ability = pool
                .get_mut(&alias.kind)
                .and_then(|queue| queue.pop_front())
                .unwrap_or_else(|| Ability::fresh(alias.kind));
            ability.resync(alias, def, scope);
            next.push(ability);
        }
    }

    next
}
