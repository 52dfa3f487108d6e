//! Scripted gamepad for host simulation runs.

use mprofile_traits::InputSource;

/// One held input state, repeated for `cycles` polls.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InputFrame {
    pub cycles: u32,
    /// Ids of the buttons held during this frame.
    pub buttons: Vec<usize>,
    /// `(axis id, value)` pairs; unlisted axes read 0.0.
    pub axes: Vec<(usize, f64)>,
}

/// Replays a fixed list of frames, one poll per control cycle.
#[derive(Debug, Clone, Default)]
pub struct ScriptedGamepad {
    frames: Vec<InputFrame>,
    frame: usize,
    served: u32,
    started: bool,
}

impl ScriptedGamepad {
    pub fn new(frames: Vec<InputFrame>) -> Self {
        Self {
            frames,
            frame: 0,
            served: 0,
            started: false,
        }
    }

    /// Total number of cycles the script covers.
    pub fn total_cycles(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.cycles)).sum()
    }

    /// True once every frame has been served.
    pub fn is_finished(&self) -> bool {
        self.frame >= self.frames.len()
    }

    fn current(&self) -> Option<&InputFrame> {
        self.frames.get(self.frame)
    }
}

impl InputSource for ScriptedGamepad {
    fn poll(&mut self) {
        if self.started {
            self.served = self.served.saturating_add(1);
        } else {
            self.started = true;
        }
        // Skip exhausted and zero-length frames.
        while let Some(f) = self.frames.get(self.frame) {
            if self.served < f.cycles {
                break;
            }
            self.served = 0;
            self.frame += 1;
        }
    }

    fn raw_button(&mut self, id: usize) -> bool {
        self.current().is_some_and(|f| f.buttons.contains(&id))
    }

    fn raw_axis(&mut self, id: usize) -> f64 {
        self.current()
            .and_then(|f| f.axes.iter().find(|(a, _)| *a == id).map(|(_, v)| *v))
            .unwrap_or(0.0)
    }
}
