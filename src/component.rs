use crate::abilities::{Ability, AbilityKindId, ResourcePool};
use crate::error::FitError;
use crate::expressions::EvalScope;
use crate::modifiers::ModifierApplication;
use crate::reconcile::reconcile_abilities;
use crate::registry::Registry;
use crate::serialization::{AbilityDef, ComponentDef, ConsumeTrigger};
use crate::stats::{channel, StatSheet};

/// Container mass budget assumed when the owning container has not supplied
/// one.
pub const DEFAULT_CONTAINER_MASS: f32 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentStatus {
    Ok,
    /// Hull has dropped under the damage threshold.
    Degraded,
    Destroyed,
}

/// One placeable part: a weapon, engine, tank, hull section...
///
/// A component owns its raw declaration, its applied modifiers, and its live
/// capability instances, and exposes the recalculation pipeline that derives
/// everything else. Every derived attribute is reproducible from
/// {declaration, container mass, modifier list} alone — recalculation always
/// restarts from the declaration, never from already-scaled values, which
/// makes it idempotent and modifier-order independent.
#[derive(Debug, Clone)]
pub struct Component {
    def: ComponentDef,
    id: String,
    name: String,
    component_type: String,
    size_class: String,

    base_mass: f32,
    mass: f32,
    base_hull: f32,
    max_hull: f32,
    hull: f32,
    damage_threshold: f32,

    container_mass: f32,
    stats: StatSheet,
    modifiers: Vec<ModifierApplication>,
    abilities: Vec<Ability>,
    status: ComponentStatus,
}

impl Component {
    /// Builds a component from a raw declaration: seeds base attributes
    /// (formula-valued ones provisionally at zero), instantiates the declared
    /// capabilities, applies any modifiers embedded in the declaration, and
    /// runs one full recalculation.
    pub fn new(def: ComponentDef, registry: &Registry) -> Self {
        let id = if def.id.is_empty() { def.name.clone() } else { def.id.clone() };
        let mut component = Self {
            id,
            name: def.name.clone(),
            component_type: def.component_type.clone(),
            size_class: def.size_class.clone(),
            base_mass: def.mass.literal_or_zero(),
            mass: def.mass.literal_or_zero(),
            base_hull: def.hull.literal_or_zero(),
            max_hull: 0.0,
            hull: 0.0,
            damage_threshold: def.damage_threshold,
            container_mass: DEFAULT_CONTAINER_MASS,
            stats: StatSheet::new(),
            modifiers: Vec::new(),
            abilities: Vec::new(),
            status: ComponentStatus::Ok,
            def,
        };

        let embedded = component.def.modifiers.clone();
        for app in embedded {
            component.push_modifier(&app.modifier, app.value, registry);
        }
        component.recalculate(registry);
        component
    }

    /// A fresh, independent instance built from the same declaration. Shares
    /// no mutable state with `self`; this is the only supported way to get
    /// several components "of the same type".
    pub fn clone_instance(&self, registry: &Registry) -> Component {
        Component::new(self.def.clone(), registry)
    }

    /// Validates and stages a modifier application without recalculating.
    /// Replaces any existing application of the same id.
    fn push_modifier(&mut self, id: &str, value: Option<f32>, registry: &Registry) -> bool {
        let Some(def) = registry.modifier(id) else {
            log::warn!("{}", FitError::UnknownModifier { id: id.to_string() });
            return false;
        };
        if !def.allows(&self.component_type) {
            log::warn!(
                "{}",
                FitError::ModifierNotAllowed {
                    id: id.to_string(),
                    component_type: self.component_type.clone(),
                }
            );
            return false;
        }
        let value = def.clamp_value(value.unwrap_or(def.default_value));
        self.modifiers.retain(|app| app.modifier != id);
        self.modifiers.push(ModifierApplication::new(id, value));
        true
    }

    /// Applies a modifier by id. Returns false — without touching the
    /// component — when the id is unknown or this component's type is
    /// excluded by the definition's restrictions. Re-applying an id replaces
    /// the previous application rather than stacking it.
    pub fn apply_modifier(&mut self, id: &str, value: Option<f32>, registry: &Registry) -> bool {
        if !self.push_modifier(id, value, registry) {
            return false;
        }
        self.recalculate(registry);
        true
    }

    /// Removes a modifier application if present. Always recalculates.
    pub fn remove_modifier(&mut self, id: &str, registry: &Registry) -> bool {
        let before = self.modifiers.len();
        self.modifiers.retain(|app| app.modifier != id);
        let removed = self.modifiers.len() != before;
        self.recalculate(registry);
        removed
    }

    /// Updates the container mass budget the declaration formulas see, and
    /// re-derives everything from it.
    pub fn set_container_mass(&mut self, mass: f32, registry: &Registry) {
        self.container_mass = mass;
        self.recalculate(registry);
    }

    fn eval_scope(&self) -> EvalScope {
        EvalScope::new().with_var("ship_mass", self.container_mass)
    }

    /// The recalculation pipeline. Runs top to bottom, always in the same
    /// order:
    ///
    /// 1. restore base attributes from the raw declaration, evaluating
    ///    formulas against the container scope
    /// 2. reconcile capability instances against the declared capabilities
    /// 3. fold modifier applications into a fresh stat sheet
    /// 4. derive final mass and hull, clamping current hull
    /// 5. resync every capability, then run the generic resource phase
    pub fn recalculate(&mut self, registry: &Registry) {
        let scope = self.eval_scope();
        self.base_mass = self.def.mass.resolve(&scope);
        self.base_hull = self.def.hull.resolve(&scope);

        let existing = std::mem::take(&mut self.abilities);
        self.abilities = reconcile_abilities(existing, &self.def.abilities, registry, &scope);

        let mut stats = StatSheet::new();
        for app in self.modifiers.iter() {
            let Some(def) = registry.modifier(&app.modifier) else {
                log::warn!("{}", FitError::UnknownModifier { id: app.modifier.clone() });
                continue;
            };
            def.effects.apply(app.value, &mut stats);
        }
        self.stats = stats;

        self.mass =
            (self.base_mass + self.stats.offset(channel::MASS)) * self.stats.mult(channel::MASS);
        let old_max = self.max_hull;
        self.max_hull = (self.base_hull * self.stats.mult(channel::HULL)).floor();
        if old_max == 0.0 || self.hull == old_max {
            self.hull = self.max_hull;
        } else {
            self.hull = self.hull.clamp(0.0, self.max_hull);
        }

        for ability in self.abilities.iter_mut() {
            ability.recalculate(&self.stats);
        }
        for ability in self.abilities.iter_mut() {
            ability.resource_resync(&self.stats);
        }

        self.refresh_status();
    }

    fn refresh_status(&mut self) {
        if self.status == ComponentStatus::Destroyed {
            return;
        }
        self.status = if self.hull < self.damage_threshold * self.max_hull {
            ComponentStatus::Degraded
        } else {
            ComponentStatus::Ok
        };
    }

    /// Applies damage (or healing, when negative) and reports the resulting
    /// status.
    ///
    /// Panics on a non-finite amount: that is a caller contract breach, not
    /// bad content.
    pub fn take_damage(&mut self, amount: f32) -> ComponentStatus {
        assert!(amount.is_finite(), "damage amount must be finite, got {}", amount);

        self.hull = (self.hull - amount).clamp(0.0, self.max_hull);
        if self.hull <= 0.0 {
            self.status = ComponentStatus::Destroyed;
        } else {
            self.refresh_status();
        }
        self.status
    }

    /// Advances every capability by `dt` seconds against the container's
    /// resource pool. Returns whether the component is operational this tick
    /// — false when destroyed or when a constant resource draw could not be
    /// covered.
    pub fn update(&mut self, dt: f32, pool: &mut ResourcePool) -> bool {
        if self.status == ComponentStatus::Destroyed {
            return false;
        }
        let mut operational = true;
        for ability in self.abilities.iter_mut() {
            operational &= ability.tick(dt, pool);
        }
        operational
    }

    /// Attempts to activate the first capability of `kind`: checks the
    /// capability is ready and every activation-trigger cost on this
    /// component can be paid, then pays them all and activates. All-or-
    /// nothing.
    pub fn try_activate(&mut self, kind: AbilityKindId, pool: &mut ResourcePool) -> bool {
        if self.status == ComponentStatus::Destroyed {
            return false;
        }
        let Some(target) = self.abilities.iter().position(|a| a.kind_id() == kind) else {
            return false;
        };
        if !self.abilities[target].can_activate(pool) {
            return false;
        }

        let costs: Vec<usize> = self
            .abilities
            .iter()
            .enumerate()
            .filter(|(i, a)| {
                *i != target
                    && matches!(
                        &a.kind,
                        crate::abilities::AbilityKind::Consumer(c)
                            if c.trigger == ConsumeTrigger::Activation
                    )
            })
            .map(|(i, _)| i)
            .collect();

        if !costs.iter().all(|&i| self.abilities[i].can_activate(pool)) {
            return false;
        }
        for &i in costs.iter() {
            self.abilities[i].activate(pool);
        }
        self.abilities[target].activate(pool)
    }

    // ------- Read-only accessors -------

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn component_type(&self) -> &str {
        &self.component_type
    }

    pub fn size_class(&self) -> &str {
        &self.size_class
    }

    /// The raw declaration this component restarts every recalculation from.
    pub fn def(&self) -> &ComponentDef {
        &self.def
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn max_hull(&self) -> f32 {
        self.max_hull
    }

    pub fn hull(&self) -> f32 {
        self.hull
    }

    pub fn damage_threshold(&self) -> f32 {
        self.damage_threshold
    }

    pub fn container_mass(&self) -> f32 {
        self.container_mass
    }

    pub fn status(&self) -> ComponentStatus {
        self.status
    }

    pub fn stats(&self) -> &StatSheet {
        &self.stats
    }

    pub fn modifiers(&self) -> &[ModifierApplication] {
        &self.modifiers
    }

    pub fn abilities(&self) -> &[Ability] {
        &self.abilities
    }

    pub fn has_ability(&self, kind: AbilityKindId) -> bool {
        self.abilities.iter().any(|a| a.kind_id() == kind)
    }

    pub fn first_ability(&self, kind: AbilityKindId) -> Option<&Ability> {
        self.abilities.iter().find(|a| a.kind_id() == kind)
    }

    pub fn abilities_of(&self, kind: AbilityKindId) -> impl Iterator<Item = &Ability> {
        self.abilities.iter().filter(move |a| a.kind_id() == kind)
    }

    pub fn abilities_tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Ability> {
        self.abilities.iter().filter(move |a| a.has_tag(tag))
    }

    /// Mutable access for drivers that manipulate live capability state
    /// directly (docking, manual resource transfer).
    pub fn abilities_mut(&mut self) -> &mut [Ability] {
        &mut self.abilities
    }

    /// Declares one more ability entry on the raw declaration and
    /// reconciles. Existing instances of the kind keep their state.
    pub fn declare_ability(&mut self, declared_name: &str, def: AbilityDef, registry: &Registry) {
        self.def.declare_ability(declared_name, def);
        self.recalculate(registry);
    }

    /// Replaces the raw declaration wholesale — the live-edit path. Applied
    /// modifiers stay; capability instances are reconciled against the new
    /// declaration, so instances whose kind survives keep their state.
    pub fn redefine(&mut self, def: ComponentDef, registry: &Registry) {
        self.name = def.name.clone();
        self.component_type = def.component_type.clone();
        self.size_class = def.size_class.clone();
        self.damage_threshold = def.damage_threshold;
        self.def = def;
        self.recalculate(registry);
    }
}
