use shipfit::prelude::*;

// Helper function for approximate equality checks
fn assert_approx_eq(a: f32, b: f32) {
    assert!((a - b).abs() < f32::EPSILON * 100.0, "left: {}, right: {}", a, b);
}

fn registry() -> Registry {
    let mut registry = Registry::with_defaults();
    for raw in [
        r#"{
            "id": "oversized", "name": "Oversized", "kind": "scaled",
            "effects": { "special": "simple_size" },
            "min_value": 0.5, "max_value": 4.0, "default_value": 2.0
        }"#,
        r#"{
            "id": "extended", "name": "Extended", "kind": "scaled",
            "effects": { "special": "simple_size" },
            "min_value": 1.0, "max_value": 3.0, "default_value": 3.0
        }"#,
        r#"{
            "id": "long_barrel", "name": "Long Barrel", "kind": "scaled",
            "effects": { "special": "range_mount" },
            "min_value": 1.0, "max_value": 3.0, "default_value": 1.0
        }"#,
        r#"{
            "id": "turret", "name": "Turret Mount", "kind": "scaled",
            "effects": { "special": "turret_mount" },
            "min_value": 30.0, "max_value": 360.0, "default_value": 180.0,
            "allowed_types": ["weapon"]
        }"#,
        r#"{
            "id": "autoloader", "name": "Autoloader", "kind": "scaled",
            "effects": { "special": "rapid_fire" },
            "min_value": 1.0, "max_value": 5.0, "default_value": 2.0
        }"#,
        r#"{
            "id": "lightweight", "name": "Lightweight", "kind": "toggle",
            "effects": { "scales": { "mass": -0.2 } }
        }"#,
    ] {
        registry.register_modifier(serde_json::from_str(raw).unwrap());
    }
    registry
}

fn storage_def() -> ComponentDef {
    serde_json::from_str(
        r#"{
            "name": "Tank", "type": "storage", "mass": 20, "hull": 40,
            "abilities": { "fuel_tank": { "capacity": 100.0 } }
        }"#,
    )
    .unwrap()
}

fn beam_def() -> ComponentDef {
    serde_json::from_str(
        r#"{
            "name": "Laser", "type": "weapon", "mass": 25, "hull": 50,
            "abilities": {
                "beam_weapon": {
                    "damage": 8.0, "range": 5000.0, "reload": 2.0,
                    "accuracy": 10.0, "falloff": 0.0001, "arc": 30.0
                }
            }
        }"#,
    )
    .unwrap()
}

fn storage_capacity(component: &Component) -> f32 {
    let ability = component.first_ability(AbilityKindId::Storage).unwrap();
    let AbilityKind::Storage(storage) = &ability.kind else { panic!("wrong kind") };
    storage.capacity
}

fn beam<'a>(component: &'a Component) -> &'a Weapon {
    let ability = component.first_ability(AbilityKindId::BeamWeapon).unwrap();
    let AbilityKind::Weapon(weapon) = &ability.kind else { panic!("wrong kind") };
    weapon
}

#[test]
fn distinct_definitions_multiply_and_reapplying_replaces() {
    let registry = registry();
    let mut component = Component::new(storage_def(), &registry);
    assert_approx_eq(storage_capacity(&component), 100.0);

    assert!(component.apply_modifier("oversized", Some(2.0), &registry));
    assert_approx_eq(storage_capacity(&component), 200.0);

    // A second, distinct definition compounds
    assert!(component.apply_modifier("extended", Some(3.0), &registry));
    assert_approx_eq(storage_capacity(&component), 600.0);

    // Re-applying the same id replaces the old value instead of stacking
    assert!(component.apply_modifier("oversized", Some(3.0), &registry));
    assert_approx_eq(storage_capacity(&component), 900.0);
    assert_eq!(component.modifiers().len(), 2);
}

#[test]
fn beam_hit_chance_is_the_exact_sigmoid() {
    let registry = registry();
    let component = Component::new(beam_def(), &registry);

    let expected = sigmoid(10.0 - 0.0001 * 9000.0);
    assert_eq!(beam(&component).hit_chance(9000.0), expected);
}

#[test]
fn range_mounts_scale_range_mass_and_hull_but_not_cost() {
    let registry = registry();
    let mut component = Component::new(beam_def(), &registry);

    component.apply_modifier("long_barrel", Some(2.0), &registry);
    assert_approx_eq(beam(&component).range, 20000.0); // 5000 * 2^2
    assert_approx_eq(component.mass(), 25.0 * 12.25); // 3.5^2
    assert_eq!(component.max_hull(), (50.0_f32 * 12.25).floor());
    assert_eq!(component.stats().mult(channel::COST), 1.0);
}

#[test]
fn turret_mounts_override_the_declared_arc() {
    let registry = registry();
    let mut component = Component::new(beam_def(), &registry);
    assert_eq!(beam(&component).arc, 30.0);

    component.apply_modifier("turret", Some(270.0), &registry);
    assert_eq!(beam(&component).arc, 270.0);
    assert_approx_eq(
        component.mass(),
        25.0 * (1.0 + 0.514 * (1.0 + 270.0_f32 / 30.0).ln()),
    );
}

#[test]
fn rapid_fire_shortens_reload() {
    let registry = registry();
    let mut component = Component::new(beam_def(), &registry);

    component.apply_modifier("autoloader", Some(2.0), &registry);
    assert_approx_eq(beam(&component).reload, 1.0); // 2.0 / 2
    assert_approx_eq(component.mass(), 25.0 * 3.0); // 1 + 2*(2-1)
}

#[test]
fn plain_scale_effects_fold_as_one_plus_delta() {
    let registry = registry();
    let mut component = Component::new(storage_def(), &registry);

    component.apply_modifier("lightweight", None, &registry);
    assert_approx_eq(component.mass(), 16.0); // 20 * 0.8
}

#[test]
fn seeker_modifiers_touch_only_projectile_channels() {
    let mut registry = registry();
    registry.register_modifier(
        serde_json::from_str(
            r#"{
                "id": "heavy_warhead", "name": "Heavy Warhead", "kind": "scaled",
                "effects": { "special": "seeker_damage" },
                "min_value": 1.0, "max_value": 4.0, "default_value": 2.0
            }"#,
        )
        .unwrap(),
    );

    let def: ComponentDef = serde_json::from_str(
        r#"{
            "name": "Torpedo Rack", "type": "weapon", "mass": 40, "hull": 60,
            "abilities": {
                "seeker_weapon": { "damage": 20.0, "range": 8000.0, "reload": 10.0, "endurance": 12.0, "hull": 5.0 }
            }
        }"#,
    )
    .unwrap();
    let mut component = Component::new(def, &registry);

    component.apply_modifier("heavy_warhead", Some(2.0), &registry);
    let ability = component.first_ability(AbilityKindId::SeekerWeapon).unwrap();
    let AbilityKind::Weapon(seeker) = &ability.kind else { panic!("wrong kind") };
    assert_approx_eq(seeker.damage, 40.0);
    assert_approx_eq(seeker.range, 8000.0); // untouched
    assert_approx_eq(component.mass(), 40.0 * 1.75);
}

#[test]
fn precision_mounts_add_flat_accuracy() {
    let mut registry = registry();
    registry.register_modifier(
        serde_json::from_str(
            r#"{
                "id": "stabilized", "name": "Stabilized", "kind": "scaled",
                "effects": { "special": "precision_mount" },
                "min_value": 1.0, "max_value": 3.0, "default_value": 1.0
            }"#,
        )
        .unwrap(),
    );

    let mut component = Component::new(beam_def(), &registry);
    component.apply_modifier("stabilized", Some(2.0), &registry);
    assert_approx_eq(beam(&component).accuracy, 11.0); // 10 + 0.5*2
    assert_approx_eq(component.mass(), 25.0 * 2.0); // 1 + 0.5*2
}

#[test]
fn type_restrictions_fail_closed_at_apply_time() {
    let registry = registry();
    let mut component = Component::new(storage_def(), &registry);
    let mass = component.mass();

    // Turrets only fit weapons
    assert!(!component.apply_modifier("turret", None, &registry));
    assert_eq!(component.mass(), mass);
    assert!(component.modifiers().is_empty());
}

#[test]
fn unknown_modifier_ids_fail_closed() {
    let registry = registry();
    let mut component = Component::new(storage_def(), &registry);
    assert!(!component.apply_modifier("phantom", None, &registry));
    assert!(component.modifiers().is_empty());
}

#[test]
fn application_values_clamp_to_the_definition_range() {
    let registry = registry();
    let mut component = Component::new(storage_def(), &registry);

    // 10.0 clamps down to the permitted maximum of 4.0
    assert!(component.apply_modifier("oversized", Some(10.0), &registry));
    assert_approx_eq(storage_capacity(&component), 400.0);
}
