//! Garden Core - a living garden of plants drawn as a drifting graph
//!
//! This crate provides the simulation and presentation core:
//! - Plant and message records (`Plant`, `Message`, `Rarity`)
//! - Simulation state with live reconciliation (`SimulationState`)
//! - Particle physics and proximity links (`physics`)
//! - Pointer picking (`picker`)
//! - Rendering onto an abstract `Surface`
//! - An owned frame loop (`AnimationDriver`) and the `Garden` it drives
//!
//! ## Data flow
//!
//! A [`StoreAdapter`] supplies plants and messages and pushes changes
//! through callbacks. Callbacks and pointer input only enqueue
//! [`GardenEvent`]s; the frame thread applies them, steps the physics and
//! renders. [`GardenSession`] wires all of it up and tears it down again:
//!
//! ```ignore
//! let session = GardenSession::open(&store, surface, GardenConfig::default(), observer)?;
//! session.events().pointer_moved(Point::new(120.0, 80.0));
//! // ...
//! session.close();
//! ```

mod chat;
mod config;
pub mod driver;
mod error;
pub mod garden;
mod geometry;
mod identity;
mod node;
pub mod physics;
pub mod picker;
mod plant;
pub mod render;
mod rng;
mod session;
mod state;
pub mod store;

pub use chat::{author_label, ChatLog};
pub use config::GardenConfig;
pub use driver::{AnimationDriver, DriverState, FrameHandler, Tick};
pub use error::{Error, Result};
pub use garden::{Garden, GardenEvent, GardenEvents, GardenObserver};
pub use geometry::{Bounds, Point};
pub use identity::{MessageId, PlantId};
pub use node::SimNode;
pub use physics::{Connection, PhysicsParams};
pub use plant::{Message, MessageKind, Plant, Rarity};
pub use render::{Color, LinkStyle, NodeStyle, RecordingSurface, Renderer, Surface};
pub use rng::GardenRng;
pub use session::GardenSession;
pub use state::SimulationState;
pub use store::{MessageCallback, PlantCallback, StoreAdapter, Subscription};
