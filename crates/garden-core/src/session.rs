//! Garden session: scoped acquisition of feeds and the frame loop

use crate::config::GardenConfig;
use crate::driver::{AnimationDriver, Tick};
use crate::garden::{Garden, GardenEvents, GardenObserver};
use crate::render::Surface;
use crate::store::{StoreAdapter, Subscription};
use crate::Result;
use tracing::info;

/// A running garden view
///
/// Holds both store subscriptions and the animation driver. Closing or
/// dropping the session stops the driver and cancels the subscriptions
/// together.
pub struct GardenSession<S: Surface + Send + 'static> {
    driver: AnimationDriver<Garden<S>>,
    subscriptions: Vec<Subscription>,
    events: GardenEvents,
}

impl<S: Surface + Send + 'static> GardenSession<S> {
    /// Subscribe, load and start animating
    ///
    /// Feeds are subscribed before the initial load so nothing written in
    /// between is missed. Load failures are reported to the observer and
    /// the garden starts with what it has. If subscribing or starting the
    /// driver fails, whatever was already acquired is released before the
    /// error is returned.
    pub fn open<A>(
        store: &A,
        surface: S,
        config: GardenConfig,
        observer: impl GardenObserver,
    ) -> Result<Self>
    where
        A: StoreAdapter + ?Sized,
    {
        let interval = config.frame_interval();
        let message_limit = config.message_limit;
        let (mut garden, events) = Garden::new(surface, config, observer);

        let mut subscriptions = Vec::with_capacity(2);
        let plant_events = events.clone();
        subscriptions.push(store.subscribe_plant_changes(Box::new(move |plant| {
            plant_events.plant_changed(plant);
        }))?);
        let message_events = events.clone();
        subscriptions.push(store.subscribe_message_inserts(Box::new(move |message| {
            message_events.message_inserted(message);
        }))?);

        match store.load_plants() {
            Ok(plants) => garden.load_plants(plants),
            Err(err) => garden.notify(&err),
        }
        match store.load_recent_messages(message_limit) {
            Ok(messages) => garden.load_messages(messages),
            Err(err) => garden.notify(&err),
        }

        let mut driver = AnimationDriver::new(garden, interval);
        driver.start()?;
        info!(
            plants = driver.handler().map_or(0, |g| g.state().len()),
            "garden session opened"
        );

        Ok(Self {
            driver,
            subscriptions,
            events,
        })
    }

    /// Sender for pointer input
    pub fn events(&self) -> GardenEvents {
        self.events.clone()
    }

    pub fn is_running(&self) -> bool {
        self.driver.is_running()
    }

    /// Frames run so far
    pub fn ticks(&self) -> Tick {
        self.driver.ticks()
    }

    /// Stop animating and release the feeds, returning the garden
    pub fn close(mut self) -> Option<Garden<S>> {
        self.shutdown();
        self.driver.take_handler()
    }

    fn shutdown(&mut self) {
        self.driver.stop();
        for subscription in &mut self.subscriptions {
            subscription.cancel();
        }
    }
}

impl<S: Surface + Send + 'static> Drop for GardenSession<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
