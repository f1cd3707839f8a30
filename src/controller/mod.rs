// CONTROLLER: Input and update loop
pub mod input;
pub mod frame_loop;

pub use input::{Action, ControlState, Controls, InputSource, KeyCode, KeyEventKind, Propagation};
pub use frame_loop::{FrameQueue, FrameScheduler, GameLoop};
