use std::cell::RefCell;
use std::rc::Rc;

/// Frame gaps at or above this many seconds skip the simulation step
pub const MAX_FRAME_DELTA: f64 = 0.2;

/// Host hook that runs a callback once at the next display refresh,
/// passing a millisecond timestamp that never decreases.
pub trait FrameScheduler {
    fn request_frame(&self, on_frame: Box<dyn FnOnce(f64)>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

/// Drives a per-frame callback with the elapsed time in seconds
pub struct GameLoop {
    last_time: f64,
    max_delta: f64,
    callback: Box<dyn FnMut(f32)>,
    state: LoopState,
    skipped: u64,
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl GameLoop {
    pub fn new() -> Self {
        Self {
            last_time: 0.0,
            max_delta: MAX_FRAME_DELTA,
            callback: Box::new(|_| {}),
            state: LoopState::Idle,
            skipped: 0,
        }
    }

    pub fn with_max_delta(mut self, seconds: f64) -> Self {
        self.max_delta = seconds;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Timestamp of the most recent tick in milliseconds
    pub fn last_time(&self) -> f64 {
        self.last_time
    }

    pub fn skipped_frames(&self) -> u64 {
        self.skipped
    }

    /// Handle one refresh at `time` ms. Returns whether the callback ran.
    pub fn tick(&mut self, time: f64) -> bool {
        let dt = (time - self.last_time) / 1000.0;
        self.last_time = time;

        if dt < self.max_delta {
            (self.callback)(dt as f32);
            true
        } else {
            // Long stall, background tab or the very first frame
            self.skipped += 1;
            tracing::debug!(dt, "frame gap too large, skipping step");
            false
        }
    }

    /// Store `callback` and keep ticking on every frame `scheduler` delivers.
    /// There is no stop; the returned handle is for inspection.
    pub fn start<S>(mut self, callback: impl FnMut(f32) + 'static, scheduler: Rc<S>) -> Rc<RefCell<GameLoop>>
    where
        S: FrameScheduler + 'static,
    {
        self.callback = Box::new(callback);
        self.state = LoopState::Running;
        tracing::info!(max_delta = self.max_delta, "game loop started");

        let handle = Rc::new(RefCell::new(self));
        schedule_next(handle.clone(), scheduler);
        handle
    }
}

fn schedule_next<S: FrameScheduler + 'static>(game_loop: Rc<RefCell<GameLoop>>, scheduler: Rc<S>) {
    let next = scheduler.clone();
    scheduler.request_frame(Box::new(move |time| {
        game_loop.borrow_mut().tick(time);
        schedule_next(game_loop, next);
    }));
}

/// Scheduler whose frames are fired by hand.
///
/// The native host fires it on every redraw; tests fire it directly.
#[derive(Default)]
pub struct FrameQueue {
    pending: RefCell<Vec<Box<dyn FnOnce(f64)>>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Run every callback requested so far. Requests made while firing
    /// wait for the next call.
    pub fn fire(&self, time: f64) -> usize {
        let due = std::mem::take(&mut *self.pending.borrow_mut());
        let count = due.len();
        for on_frame in due {
            on_frame(time);
        }
        count
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&self, on_frame: Box<dyn FnOnce(f64)>) {
        self.pending.borrow_mut().push(on_frame);
    }
}
