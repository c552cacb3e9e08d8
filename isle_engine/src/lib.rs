//! Interactive actor lifecycle and persistent mission state for the island.
//!
//! Actors are created from scripted-action descriptors, bind the mission
//! records they need from the [`state::GameState`] registry, receive periodic
//! tickles from the [`tickle::TickleScheduler`] and react to notifications
//! routed through their handler tables. All of it runs on one cooperative
//! frame loop; shared data travels through an explicit [`IsleContext`].

pub mod action;
pub mod actors;
pub mod context;
pub mod error;
pub mod notify;
pub mod scenario;
pub mod state;
pub mod tickle;
pub mod world;

pub use action::ScriptedAction;
pub use actors::{Actor, ActorClass, Lifecycle};
pub use context::IsleContext;
pub use notify::{Notification, NotificationKind, NotifyResult};
pub use world::{ActorId, World};
