pub use crate::abilities::{
    Ability, AbilityKind, AbilityKindId, Consumer, CrewQuarters, CrewRequirement, Generator,
    LaunchBay, Marker, ResourcePool, Shield, Storage, Targeting, Thruster, Turning,
};
pub use crate::aggregate;
pub use crate::component::{Component, ComponentStatus, DEFAULT_CONTAINER_MASS};
pub use crate::effects::{EffectSet, SpecialEffect};
pub use crate::error::{FitError, FitResult};
pub use crate::expressions::{AttributeValue, EvalScope, Expression};
pub use crate::modifiers::{
    ModifierApplication, ModifierApplicationDef, ModifierDef, ModifierKind,
};
pub use crate::registry::{AbilityAlias, Registry};
pub use crate::serialization::{AbilityDef, AbilityEntries, ComponentDef, ConsumeTrigger};
pub use crate::stats::{channel, StatSheet};
pub use crate::weapons::{sigmoid, Weapon, WeaponClass};
