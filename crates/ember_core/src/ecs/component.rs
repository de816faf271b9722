//! # Component System
//!
//! Components are pure data containers with no behavior.

/// Marker trait for ECS components.
///
/// Components must be:
/// - `Default`: dense stores pre-fill every slot and reset removed slots to
///   the default value, so a default value never means "present"
/// - `'static`: stores are looked up by `TypeId`
///
/// Implemented for every type that qualifies.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Copy, Default)]
/// struct Velocity {
///     x: f32,
///     y: f32,
/// }
///
/// manager.register_dense::<Velocity>(1024);
/// ```
pub trait Component: Default + 'static {
    /// Human-readable type name used in diagnostics.
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<T: Default + 'static> Component for T {}
