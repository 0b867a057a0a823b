//! Collaborator-facing extension points.
//!
//! Legend, tooltip and similar collaborators attach through lifecycle hooks
//! so the renderer never depends on them.

pub mod hooks;

pub use hooks::{HookEvent, HookFn, HookPayload, HookRegistry, Rect};
