//! Animation driver: the self-rescheduling frame loop
//!
//! The driver owns its frame handler. While stopped the handler sits in
//! the driver; `start` moves it onto a dedicated frame thread that calls
//! it once per frame interval until `stop` wakes the thread, joins it and
//! takes the handler back. Everything the handler touches therefore runs
//! on one thread, one frame at a time.

use crate::{Error, Result};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Frame counter (logical time unit)
pub type Tick = u64;

/// Work done once per frame
pub trait FrameHandler: Send + 'static {
    /// Run one frame
    ///
    /// Errors are logged by the driver and never stop the loop. Neither do
    /// panics; the frame is abandoned and the next one runs on schedule.
    fn on_frame(&mut self, tick: Tick) -> Result<()>;
}

/// Lifecycle of an [`AnimationDriver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverState {
    #[default]
    Stopped,
    Running,
}

struct FrameLoop<H> {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<H>,
}

/// Owned frame loop with explicit `start`/`stop`
pub struct AnimationDriver<H: FrameHandler> {
    interval: Duration,
    handler: Option<H>,
    running: Option<FrameLoop<H>>,
    ticks: Arc<AtomicU64>,
}

impl<H: FrameHandler> AnimationDriver<H> {
    /// Create a stopped driver
    pub fn new(handler: H, interval: Duration) -> Self {
        Self {
            interval,
            handler: Some(handler),
            running: None,
            ticks: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn state(&self) -> DriverState {
        match &self.running {
            Some(frame_loop) if !frame_loop.thread.is_finished() => DriverState::Running,
            _ => DriverState::Stopped,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == DriverState::Running
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of frames run so far, across restarts
    pub fn ticks(&self) -> Tick {
        self.ticks.load(Ordering::Acquire)
    }

    /// Start the frame loop
    ///
    /// Starting a running driver does nothing.
    pub fn start(&mut self) -> Result<()> {
        if self.running.is_some() {
            return Ok(());
        }

        let mut handler = self
            .handler
            .take()
            .ok_or_else(|| Error::DriverUnavailable("frame handler was lost".to_string()))?;

        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let ticks = self.ticks.clone();
        let interval = self.interval;

        let thread = thread::Builder::new()
            .name("garden-frames".to_string())
            .spawn(move || {
                run_frames(&mut handler, &flag, &ticks, interval);
                handler
            })?;

        info!(?interval, "animation driver started");
        self.running = Some(FrameLoop { stop, thread });
        Ok(())
    }

    /// Stop the frame loop
    ///
    /// Returns once the frame thread has exited, so no frame runs after
    /// this call. Stopping a stopped driver does nothing.
    pub fn stop(&mut self) {
        let Some(frame_loop) = self.running.take() else {
            return;
        };

        frame_loop.stop.store(true, Ordering::Release);
        frame_loop.thread.thread().unpark();

        match frame_loop.thread.join() {
            Ok(handler) => {
                self.handler = Some(handler);
                info!(ticks = self.ticks(), "animation driver stopped");
            }
            Err(_) => error!("frame thread panicked; frame handler lost"),
        }
    }

    /// The handler, while the driver is stopped
    pub fn handler(&self) -> Option<&H> {
        self.handler.as_ref()
    }

    /// Mutable access to the handler, while the driver is stopped
    pub fn handler_mut(&mut self) -> Option<&mut H> {
        self.handler.as_mut()
    }

    /// Stop the driver and take the handler out of it
    pub fn take_handler(&mut self) -> Option<H> {
        self.stop();
        self.handler.take()
    }
}

impl<H: FrameHandler> Drop for AnimationDriver<H> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_frames<H: FrameHandler>(
    handler: &mut H,
    stop: &AtomicBool,
    ticks: &AtomicU64,
    interval: Duration,
) {
    let mut next_frame = Instant::now();

    while !stop.load(Ordering::Acquire) {
        let tick = ticks.fetch_add(1, Ordering::AcqRel) + 1;
        match catch_unwind(AssertUnwindSafe(|| handler.on_frame(tick))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) if err.is_frame_skip() => debug!(tick, error = %err, "frame skipped"),
            Ok(Err(err)) => warn!(tick, error = %err, "frame failed"),
            Err(payload) => error!(tick, panic = panic_message(&*payload), "frame panicked"),
        }

        // Late frames are not made up; the schedule restarts from now.
        next_frame += interval;
        let now = Instant::now();
        if next_frame < now {
            next_frame = now;
        }

        loop {
            if stop.load(Ordering::Acquire) {
                return;
            }
            let now = Instant::now();
            if now >= next_frame {
                break;
            }
            thread::park_timeout(next_frame - now);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct Counter {
        frames: Arc<AtomicU64>,
        last_tick: Tick,
    }

    impl FrameHandler for Counter {
        fn on_frame(&mut self, tick: Tick) -> Result<()> {
            self.frames.fetch_add(1, Ordering::SeqCst);
            self.last_tick = tick;
            Ok(())
        }
    }

    fn counter() -> (Counter, Arc<AtomicU64>) {
        let frames = Arc::new(AtomicU64::new(0));
        (
            Counter {
                frames: frames.clone(),
                last_tick: 0,
            },
            frames,
        )
    }

    #[test]
    fn test_starts_stopped() {
        let (handler, frames) = counter();
        let driver = AnimationDriver::new(handler, Duration::from_millis(1));

        assert_eq!(driver.state(), DriverState::Stopped);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(frames.load(Ordering::SeqCst), 0);
        assert_eq!(driver.ticks(), 0);
    }

    #[test]
    fn test_no_ticks_after_stop() {
        let (handler, frames) = counter();
        let mut driver = AnimationDriver::new(handler, Duration::from_millis(2));

        driver.start().unwrap();
        assert!(driver.is_running());
        thread::sleep(Duration::from_millis(60));
        driver.stop();

        let stopped_at = frames.load(Ordering::SeqCst);
        assert!(stopped_at > 0);
        assert_eq!(driver.ticks(), stopped_at);
        assert_eq!(driver.handler().unwrap().last_tick, stopped_at);

        thread::sleep(Duration::from_millis(40));
        assert_eq!(frames.load(Ordering::SeqCst), stopped_at);
        assert_eq!(driver.state(), DriverState::Stopped);
    }

    #[test]
    fn test_stop_and_start_are_idempotent() {
        let (handler, frames) = counter();
        let mut driver = AnimationDriver::new(handler, Duration::from_millis(2));

        driver.stop();
        driver.start().unwrap();
        driver.start().unwrap();
        thread::sleep(Duration::from_millis(20));
        driver.stop();
        driver.stop();

        let first_run = frames.load(Ordering::SeqCst);
        driver.start().unwrap();
        thread::sleep(Duration::from_millis(20));
        driver.stop();

        assert!(frames.load(Ordering::SeqCst) > first_run);
        assert_eq!(driver.ticks(), frames.load(Ordering::SeqCst));
    }

    #[test]
    fn test_stop_wakes_long_interval() {
        let (handler, _frames) = counter();
        let mut driver = AnimationDriver::new(handler, Duration::from_secs(30));

        driver.start().unwrap();
        thread::sleep(Duration::from_millis(10));
        let started = Instant::now();
        driver.stop();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(driver.ticks(), 1);
    }

    struct Failing {
        calls: Arc<AtomicUsize>,
    }

    impl FrameHandler for Failing {
        fn on_frame(&mut self, tick: Tick) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if tick % 2 == 0 {
                Err(Error::SurfaceUnavailable)
            } else {
                Err(Error::InvalidPlant("bad frame".to_string()))
            }
        }
    }

    #[test]
    fn test_errors_do_not_stop_the_loop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut driver = AnimationDriver::new(
            Failing {
                calls: calls.clone(),
            },
            Duration::from_millis(1),
        );

        driver.start().unwrap();
        thread::sleep(Duration::from_millis(50));
        driver.stop();

        assert!(calls.load(Ordering::SeqCst) > 2);
    }

    struct Panicky {
        frames: Arc<AtomicU64>,
    }

    impl FrameHandler for Panicky {
        fn on_frame(&mut self, tick: Tick) -> Result<()> {
            self.frames.fetch_add(1, Ordering::SeqCst);
            if tick == 3 {
                panic!("observer blew up on tick {tick}");
            }
            Ok(())
        }
    }

    #[test]
    fn test_panicking_frame_does_not_stop_the_loop() {
        let frames = Arc::new(AtomicU64::new(0));
        let mut driver = AnimationDriver::new(
            Panicky {
                frames: frames.clone(),
            },
            Duration::from_millis(1),
        );

        driver.start().unwrap();
        thread::sleep(Duration::from_millis(50));

        assert!(frames.load(Ordering::SeqCst) > 3);
        assert_eq!(driver.state(), DriverState::Running);

        driver.stop();
        assert!(driver.handler().is_some());
        assert_eq!(driver.state(), DriverState::Stopped);
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&"boom".to_string()), "boom");
        assert_eq!(panic_message(&7u8), "non-string panic payload");
    }

    #[test]
    fn test_drop_stops_loop() {
        let (handler, frames) = counter();
        {
            let mut driver = AnimationDriver::new(handler, Duration::from_millis(1));
            driver.start().unwrap();
            thread::sleep(Duration::from_millis(10));
        }
        let after_drop = frames.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(frames.load(Ordering::SeqCst), after_drop);
    }
}
