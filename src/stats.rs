use std::collections::HashMap;

/// Channel names the effect engine and capability resync agree on.
pub mod channel {
    pub const MASS: &str = "mass";
    pub const HULL: &str = "hull";
    pub const DAMAGE: &str = "damage";
    pub const RANGE: &str = "range";
    pub const COST: &str = "cost";
    pub const THRUST: &str = "thrust";
    pub const TURN: &str = "turn";
    pub const RESOURCE: &str = "resource";
    pub const RELOAD: &str = "reload";
    pub const ACCURACY: &str = "accuracy";
    pub const ARC: &str = "arc";
    pub const FACING: &str = "facing";
    pub const ENDURANCE: &str = "endurance";
    pub const PROJECTILE_DAMAGE: &str = "projectile_damage";
    pub const PROJECTILE_HULL: &str = "projectile_hull";
    pub const STEALTH: &str = "stealth";
    pub const CREW: &str = "crew";
    pub const SHIELD: &str = "shield";
}

/// Accumulator for derived-stat scaling, rebuilt from scratch on every
/// recalculation.
///
/// Three kinds of channel:
/// - multiplicative, neutral at 1.0 (`mul` / `mult`)
/// - additive offsets, neutral at 0.0 (`add` / `offset`)
/// - overrides, unset by default, last write wins (`set_override` / `override_for`)
///
/// Unset channels read back as their neutral value, so consumers never need
/// to know which modifiers ran.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatSheet {
    mults: HashMap<String, f32>,
    offsets: HashMap<String, f32>,
    overrides: HashMap<String, f32>,
}

impl StatSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Multiplies a channel's running multiplier by `factor`.
    pub fn mul(&mut self, channel: &str, factor: f32) {
        let entry = self.mults.entry(channel.to_string()).or_insert(1.0);
        *entry *= factor;
    }

    /// Bumps a channel's running multiplier additively. Rapid-fire mounts add
    /// mass on top of the multiplier instead of scaling it.
    pub fn add_mult(&mut self, channel: &str, delta: f32) {
        let entry = self.mults.entry(channel.to_string()).or_insert(1.0);
        *entry += delta;
    }

    /// Adds to a channel's additive offset.
    pub fn add(&mut self, channel: &str, amount: f32) {
        let entry = self.offsets.entry(channel.to_string()).or_insert(0.0);
        *entry += amount;
    }

    /// Sets a channel override. The last applied override wins.
    pub fn set_override(&mut self, channel: &str, value: f32) {
        self.overrides.insert(channel.to_string(), value);
    }

    pub fn mult(&self, channel: &str) -> f32 {
        self.mults.get(channel).copied().unwrap_or(1.0)
    }

    pub fn offset(&self, channel: &str) -> f32 {
        self.offsets.get(channel).copied().unwrap_or(0.0)
    }

    pub fn override_for(&self, channel: &str) -> Option<f32> {
        self.overrides.get(channel).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_channels_are_neutral() {
        let sheet = StatSheet::new();
        assert_eq!(sheet.mult(channel::MASS), 1.0);
        assert_eq!(sheet.offset(channel::ACCURACY), 0.0);
        assert_eq!(sheet.override_for(channel::ARC), None);
    }

    #[test]
    fn multipliers_compound_and_offsets_accumulate() {
        let mut sheet = StatSheet::new();
        sheet.mul(channel::MASS, 2.0);
        sheet.mul(channel::MASS, 3.0);
        sheet.add(channel::ACCURACY, 0.5);
        sheet.add(channel::ACCURACY, 1.0);
        assert_eq!(sheet.mult(channel::MASS), 6.0);
        assert_eq!(sheet.offset(channel::ACCURACY), 1.5);
    }

    #[test]
    fn add_mult_bumps_the_running_multiplier() {
        let mut sheet = StatSheet::new();
        sheet.mul(channel::MASS, 2.0);
        sheet.add_mult(channel::MASS, 0.5);
        assert_eq!(sheet.mult(channel::MASS), 2.5);
    }

    #[test]
    fn last_override_wins() {
        let mut sheet = StatSheet::new();
        sheet.set_override(channel::ARC, 90.0);
        sheet.set_override(channel::ARC, 180.0);
        assert_eq!(sheet.override_for(channel::ARC), Some(180.0));
    }
}
