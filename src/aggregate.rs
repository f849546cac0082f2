use indexmap::IndexMap;

use crate::abilities::{AbilityKind, AbilityKindId};
use crate::component::{Component, ComponentStatus};

/// Combines same-kind capability contributions under one container,
/// respecting redundancy.
///
/// Values sharing a stack group overlap redundantly — only the best one
/// counts (max). Distinct stack groups are independent layers and compound
/// (multiply). Ungrouped values are plain additive contributions (sum).
/// When grouped and ungrouped values meet, each ungrouped value counts as
/// its own independent layer. An empty slice reduces to 0.0.
pub fn stacked(values: &[(Option<&str>, f32)]) -> f32 {
    let mut groups: IndexMap<&str, f32> = IndexMap::new();
    let mut ungrouped: Vec<f32> = Vec::new();

    for (group, value) in values {
        match group {
            Some(name) => {
                groups
                    .entry(name)
                    .and_modify(|best| *best = best.max(*value))
                    .or_insert(*value);
            }
            None => ungrouped.push(*value),
        }
    }

    if groups.is_empty() {
        return ungrouped.iter().sum();
    }

    let mut total: f32 = groups.values().product();
    for value in ungrouped {
        total *= value;
    }
    total
}

/// Collects `(stack_group, value)` pairs for one capability kind across many
/// components. Destroyed components contribute nothing.
fn collect<'a, F>(
    components: &'a [&Component],
    kind: AbilityKindId,
    extract: F,
) -> Vec<(Option<&'a str>, f32)>
where
    F: Fn(&AbilityKind) -> Option<f32>,
{
    let mut values = Vec::new();
    for component in components {
        if component.status() == ComponentStatus::Destroyed {
            continue;
        }
        for ability in component.abilities_of(kind) {
            if let Some(value) = extract(&ability.kind) {
                values.push((ability.stack_group.as_deref(), value));
            }
        }
    }
    values
}

pub fn total_thrust(components: &[&Component]) -> f32 {
    stacked(&collect(components, AbilityKindId::Thruster, |kind| match kind {
        AbilityKind::Thruster(t) => Some(t.thrust),
        _ => None,
    }))
}

pub fn total_turn(components: &[&Component]) -> f32 {
    stacked(&collect(components, AbilityKindId::Turning, |kind| match kind {
        AbilityKind::Turning(t) => Some(t.turn),
        _ => None,
    }))
}

pub fn total_crew_capacity(components: &[&Component]) -> f32 {
    stacked(&collect(components, AbilityKindId::CrewQuarters, |kind| match kind {
        AbilityKind::CrewQuarters(q) => Some(q.capacity),
        _ => None,
    }))
}

pub fn total_crew_required(components: &[&Component]) -> f32 {
    stacked(&collect(components, AbilityKindId::CrewRequirement, |kind| match kind {
        AbilityKind::CrewRequirement(r) => Some(r.required),
        _ => None,
    }))
}

pub fn storage_capacity(components: &[&Component], resource: &str) -> f32 {
    stacked(&collect(components, AbilityKindId::Storage, |kind| match kind {
        AbilityKind::Storage(s) if s.resource == resource => Some(s.capacity),
        _ => None,
    }))
}

pub fn stored_amount(components: &[&Component], resource: &str) -> f32 {
    stacked(&collect(components, AbilityKindId::Storage, |kind| match kind {
        AbilityKind::Storage(s) if s.resource == resource => Some(s.amount),
        _ => None,
    }))
}

pub fn generation_rate(components: &[&Component], resource: &str) -> f32 {
    stacked(&collect(components, AbilityKindId::Generator, |kind| match kind {
        AbilityKind::Generator(g) if g.resource == resource => Some(g.rate),
        _ => None,
    }))
}

pub fn shield_capacity(components: &[&Component]) -> f32 {
    stacked(&collect(components, AbilityKindId::Shield, |kind| match kind {
        AbilityKind::Shield(s) => Some(s.capacity),
        _ => None,
    }))
}

/// Offensive to-hit score. Aggregated separately from [`defense_rating`]
/// even though both come from the same targeting capability family.
pub fn attack_rating(components: &[&Component]) -> f32 {
    stacked(&collect(components, AbilityKindId::Targeting, |kind| match kind {
        AbilityKind::Targeting(t) => Some(t.attack),
        _ => None,
    }))
}

/// Defensive to-hit score (ECM layers and the like).
pub fn defense_rating(components: &[&Component]) -> f32 {
    stacked(&collect(components, AbilityKindId::Targeting, |kind| match kind {
        AbilityKind::Targeting(t) => Some(t.defense),
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_group_takes_the_maximum() {
        let values = [(Some("sensor"), 3.0), (Some("sensor"), 5.0)];
        assert_eq!(stacked(&values), 5.0);
    }

    #[test]
    fn distinct_groups_compound() {
        let values = [(Some("ecm"), 0.8), (Some("chaff"), 0.5)];
        assert_eq!(stacked(&values), 0.4);
    }

    #[test]
    fn ungrouped_values_sum() {
        let values = [(None, 10.0), (None, 6.0)];
        assert_eq!(stacked(&values), 16.0);
    }

    #[test]
    fn mixed_groups_and_duplicates() {
        // Two redundant sensors (max 5.0) times an independent 2.0 layer
        let values = [(Some("sensor"), 3.0), (Some("sensor"), 5.0), (Some("dish"), 2.0)];
        assert_eq!(stacked(&values), 10.0);
    }

    #[test]
    fn empty_input_reduces_to_zero() {
        assert_eq!(stacked(&[]), 0.0);
    }
}
