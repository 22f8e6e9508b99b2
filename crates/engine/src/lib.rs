//! Engine module - frame scheduling, entities, and the game world
//!
//! The heart of the runtime: a fixed-rate frame loop driving polymorphic
//! entities over the layered canvas, with audio channels managed on the
//! side. The scheduler is generic over its display surface and input
//! event source, so the same loop runs against a real terminal or a test
//! double.
//!
//! # Frame anatomy
//!
//! 1. **PreStep** - deferred entity commands, `begin_step` hooks, audio
//!    loop feeding, input drain (quit + one-shot wheel delta)
//! 2. user `pre_step`
//! 3. **Step** - entity `step` hooks (drawing happens here), compositing
//! 4. user `post_step`
//! 5. **PostStep** - present if dirty, clear the entity/debug layers and
//!    the dynamic collision plane, `end_step` hooks
//! 6. **TimingLog** - rolling FPS, debug overlay (debug mode only)
//! 7. **Sync** - spin-wait to the frame deadline
//!
//! Within one frame every `begin_step` runs before any `step`, and every
//! `step` before any `end_step`, in registration order. Missing the
//! frame budget is observable through [`World::delta_time`], never fatal.

pub mod entity;
pub mod scheduler;
pub mod world;

pub use entity::{Entity, EntityId, EntityRegistry};
pub use scheduler::{Engine, EngineConfig, Game, RunState, Surface};
pub use world::World;
