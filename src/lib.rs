//! A data-driven capability and stat-computation engine for ship components.
//!
//! A [`ComponentDef`](crate::serialization::ComponentDef) declares what a
//! part is — attributes, capabilities, embedded modifiers. A
//! [`Component`](crate::component::Component) turns that declaration plus an
//! ordered set of applied modifiers into fully resolved runtime attributes,
//! and keeps the resolution correct as declarations, modifiers, and the
//! owning container change over the component's lifetime.

pub mod abilities;
pub mod aggregate;
pub mod component;
pub mod effects;
pub mod error;
pub mod expressions;
pub mod modifiers;
pub mod prelude;
pub mod reconcile;
pub mod registry;
pub mod serialization;
pub mod stats;
pub mod weapons;
