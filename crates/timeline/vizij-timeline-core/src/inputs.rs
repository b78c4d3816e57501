//! Input contracts for the core engine.
//!
//! Adapters build and pass these into `Engine::update()` each tick, alongside
//! the frame's [`crate::clock::ClockInput`].

use serde::{Deserialize, Serialize};

use crate::ids::TimerId;

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Inputs {
    /// Instance commands applied before the timers advance.
    #[serde(default)]
    pub commands: Vec<TimelineCommand>,
}

impl Inputs {
    pub fn play(timer: TimerId) -> Self {
        Self {
            commands: vec![TimelineCommand::Play { timer }],
        }
    }

    pub fn stop(timer: TimerId) -> Self {
        Self {
            commands: vec![TimelineCommand::Stop { timer }],
        }
    }
}

/// Commands address timeline instances by their root timer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum TimelineCommand {
    /// Request the instance to run; takes effect as an activation edge.
    Play { timer: TimerId },
    /// Request the instance to stop; dependents go inactive this tick.
    Stop { timer: TimerId },
}
