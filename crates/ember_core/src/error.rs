//! # Error Types
//!
//! Every per-call, data-level problem (bad id, redundant mutation) is logged
//! where it is detected and reported back as an [`EcsError`]. The operation is
//! always a no-op in that case; nothing is propagated further by the core.
//!
//! Wiring errors (a typed call on an unregistered component type) are not
//! represented here: they panic.

use thiserror::Error;

use crate::ecs::EntityId;

/// Errors reported by component stores and the entity manager.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcsError {
    /// The reserved null id was passed to a store.
    #[error("the null entity id cannot hold components")]
    NullEntity,

    /// The id does not fit a fixed-capacity store.
    #[error("entity {id} is outside the store capacity of {capacity}")]
    OutOfRange {
        /// The rejected id.
        id: EntityId,
        /// Capacity of the store.
        capacity: usize,
    },

    /// The entity already has a committed component that is not being removed.
    #[error("entity {id} already has a {component} component")]
    AlreadyPresent {
        /// The entity.
        id: EntityId,
        /// Component type name.
        component: &'static str,
    },

    /// The entity has no committed component to remove.
    #[error("entity {id} has no {component} component")]
    Missing {
        /// The entity.
        id: EntityId,
        /// Component type name.
        component: &'static str,
    },

    /// A removal for this entity is already queued in this tick.
    #[error("removal of {component} from entity {id} is already queued")]
    RemovalPending {
        /// The entity.
        id: EntityId,
        /// Component type name.
        component: &'static str,
    },

    /// The entity id is not alive (never issued, or already destroyed).
    #[error("entity {0} is not alive")]
    DeadEntity(EntityId),
}

/// Result type for entity and component operations.
pub type EcsResult<T> = Result<T, EcsError>;

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration text is not valid TOML for the expected schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but holds an unusable value.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
