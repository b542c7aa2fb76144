//! Operators producing a modified transform.
//!
//! Each one acquires an exclusive representation, validates,
//! writes its change, and re-checks invariants before wrapping the result.
mod label;
mod mark_bounds;
pub use mark_bounds::apply_change_implicit_state;
mod slice;
pub use slice::SliceBounds;
mod translate;
mod transpose;
