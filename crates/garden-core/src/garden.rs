//! The garden: one frame handler tying simulation, chat, picking and
//! rendering together
//!
//! Nothing outside the frame thread touches a [`Garden`] while it runs.
//! Store callbacks and host input go through [`GardenEvents`], which only
//! enqueue; the queue is drained at the start of every frame.

use crate::chat::ChatLog;
use crate::config::GardenConfig;
use crate::driver::{FrameHandler, Tick};
use crate::physics;
use crate::picker;
use crate::render::{Renderer, Surface};
use crate::state::SimulationState;
use crate::{Bounds, Error, Message, Plant, Point, Result, SimNode};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use tracing::{debug, trace, warn};

/// Upper bound on events handled in one frame, so a flooding feed cannot
/// stall rendering
const MAX_EVENTS_PER_FRAME: usize = 1024;

/// Input to the garden, applied between frames
#[derive(Debug, Clone, PartialEq)]
pub enum GardenEvent {
    /// A plant was inserted or updated in the store
    PlantChanged(Plant),
    /// A message was inserted in the store
    MessageInserted(Message),
    /// Pointer position in logical surface units
    PointerMoved(Point),
    PointerLeft,
}

/// Cloneable sending half of a garden's event inbox
#[derive(Debug, Clone)]
pub struct GardenEvents {
    tx: Sender<GardenEvent>,
}

impl GardenEvents {
    /// Queue an event. Returns false once the garden is gone.
    pub fn send(&self, event: GardenEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn plant_changed(&self, plant: Plant) -> bool {
        self.send(GardenEvent::PlantChanged(plant))
    }

    pub fn message_inserted(&self, message: Message) -> bool {
        self.send(GardenEvent::MessageInserted(message))
    }

    pub fn pointer_moved(&self, position: Point) -> bool {
        self.send(GardenEvent::PointerMoved(position))
    }

    pub fn pointer_left(&self) -> bool {
        self.send(GardenEvent::PointerLeft)
    }
}

/// Host-side view of what the garden wants to show outside the surface
///
/// All methods run on the frame thread. The default implementations do
/// nothing.
pub trait GardenObserver: Send + 'static {
    /// Plant under the pointer, or None; called on every pointer move and leave
    fn on_hover(&mut self, plant: Option<&Plant>) {
        let _ = plant;
    }

    /// Called whenever the chat buffer changes
    ///
    /// `plants` resolves message authors, see [`crate::author_label`].
    fn on_messages(&mut self, chat: &ChatLog, plants: &SimulationState) {
        let _ = (chat, plants);
    }

    /// Non-fatal error worth telling the user about
    fn on_notice(&mut self, error: &Error) {
        let _ = error;
    }
}

impl GardenObserver for () {}

/// A live garden bound to a drawing surface
pub struct Garden<S> {
    config: GardenConfig,
    state: SimulationState,
    chat: ChatLog,
    renderer: Renderer,
    surface: S,
    inbox: Receiver<GardenEvent>,
    observer: Box<dyn GardenObserver>,
    pointer: Option<Point>,
}

impl<S: Surface> Garden<S> {
    /// Create a garden and the sender for its event inbox
    pub fn new(
        surface: S,
        config: GardenConfig,
        observer: impl GardenObserver,
    ) -> (Self, GardenEvents) {
        let (tx, inbox) = mpsc::channel();
        let bounds = surface.size().unwrap_or(Bounds::new(0.0, 0.0));
        let state = SimulationState::new(config.seed, bounds)
            .with_initial_speed(config.physics.initial_speed);

        let garden = Self {
            chat: ChatLog::with_capacity(config.chat_capacity),
            renderer: Renderer::new(config.nodes.clone(), config.links.clone()),
            state,
            surface,
            inbox,
            observer: Box::new(observer),
            pointer: None,
            config,
        };
        (garden, GardenEvents { tx })
    }

    /// Merge a full plant reload
    pub fn load_plants(&mut self, plants: Vec<Plant>) {
        let count = plants.len();
        self.sync_bounds();
        if self.config.prune_on_reload {
            self.state.reset_pruning(plants);
        } else {
            self.state.reset(plants);
        }
        debug!(loaded = count, nodes = self.state.len(), "plants reloaded");
    }

    /// Replace the chat buffer with a newest-first batch
    pub fn load_messages(&mut self, messages: Vec<Message>) {
        self.chat.replace(messages);
        self.observer.on_messages(&self.chat, &self.state);
    }

    /// Log a non-fatal error and pass it to the observer
    pub fn notify(&mut self, error: &Error) {
        warn!(error = %error, "garden notice");
        self.observer.on_notice(error);
    }

    /// Apply queued events; returns how many were handled
    pub fn drain_events(&mut self) -> usize {
        let mut handled = 0;
        while handled < MAX_EVENTS_PER_FRAME {
            match self.inbox.try_recv() {
                Ok(event) => {
                    self.handle_event(event);
                    handled += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        handled
    }

    fn handle_event(&mut self, event: GardenEvent) {
        match event {
            GardenEvent::PlantChanged(plant) => match self.state.apply_change(plant) {
                Ok(created) => trace!(created, "plant change applied"),
                Err(err) => self.notify(&err),
            },
            GardenEvent::MessageInserted(message) => {
                if self.chat.push(message) {
                    self.observer.on_messages(&self.chat, &self.state);
                } else {
                    trace!("message already in chat");
                }
            }
            GardenEvent::PointerMoved(position) => {
                self.pointer = Some(position);
                let hovered = picker::pick(self.state.nodes(), position, self.config.pick_radius);
                self.observer.on_hover(hovered);
            }
            GardenEvent::PointerLeft => {
                self.pointer = None;
                self.observer.on_hover(None);
            }
        }
    }

    fn sync_bounds(&mut self) -> Option<Bounds> {
        let size = self.surface.size()?;
        if size != self.state.bounds() {
            debug!(width = size.width, height = size.height, "viewport resized");
            self.state.set_bounds(size);
        }
        Some(size)
    }

    /// Run one frame: events, bounds, physics, links, drawing
    ///
    /// Events are applied even when the surface is unavailable; the rest
    /// of the frame is skipped with `SurfaceUnavailable`.
    pub fn tick(&mut self) -> Result<()> {
        let size = self.sync_bounds();
        self.drain_events();
        if size.is_none() {
            return Err(Error::SurfaceUnavailable);
        }

        self.state.step(&self.config.physics);

        let nodes: Vec<&SimNode> = self.state.nodes().collect();
        let links = physics::connections(&nodes, self.renderer.link_style().threshold);
        self.renderer.render(&mut self.surface, &nodes, &links)
    }

    /// Plant under the last known pointer position
    pub fn hovered(&self) -> Option<&Plant> {
        let pointer = self.pointer?;
        picker::pick(self.state.nodes(), pointer, self.config.pick_radius)
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub fn config(&self) -> &GardenConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

impl<S: Surface + Send + 'static> FrameHandler for Garden<S> {
    fn on_frame(&mut self, _tick: Tick) -> Result<()> {
        self.tick()
    }
}
