//! Animation clocks. A clip is a list of sprite-sheet cells with their sizes
//! and a frame rate; the simulation selects clips by key and reads back the
//! current frame's size, never its pixels.

use tracing::warn;

/// One sprite-sheet cell and its size in sheet pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    pub cell: (u8, u8),
    pub size: (u8, u8),
}

impl Frame {
    pub const fn new(col: u8, row: u8, w: u8, h: u8) -> Self {
        Self {
            cell: (col, row),
            size: (w, h),
        }
    }
}

#[derive(Debug)]
pub struct Clip {
    pub key: &'static str,
    pub fps: f32,
    pub frames: &'static [Frame],
}

impl Clip {
    pub fn duration(&self) -> f32 {
        self.frames.len() as f32 / self.fps
    }
}

// ── Clip tables ──────────────────────────────────────────────────────────────

pub const PIRATE_IDLE: &str = "idle";
pub const PIRATE_RUN: &str = "run";
pub const PIRATE_CROUCH: &str = "crouch";
pub const PIRATE_HOLD: &str = "hold";
pub const PIRATE_DEAD: &str = "dead";

const STAND: (u8, u8) = (10, 14);
const CROUCH: (u8, u8) = (10, 10);

const fn stand(col: u8, row: u8) -> Frame {
    Frame::new(col, row, STAND.0, STAND.1)
}

const fn crouch(col: u8, row: u8) -> Frame {
    Frame::new(col, row, CROUCH.0, CROUCH.1)
}

pub static PIRATE_CLIPS: &[Clip] = &[
    Clip { key: "idle", fps: 5.0, frames: &[stand(0, 0), stand(1, 0)] },
    Clip { key: "run", fps: 5.0, frames: &[stand(0, 1), stand(1, 1)] },
    Clip { key: "crouch-idle", fps: 5.0, frames: &[crouch(2, 0)] },
    Clip { key: "crouch-run", fps: 5.0, frames: &[crouch(2, 1), crouch(3, 1)] },
    Clip { key: "idle-hold", fps: 5.0, frames: &[stand(0, 3)] },
    Clip { key: "run-hold", fps: 5.0, frames: &[stand(0, 3), stand(1, 3)] },
    Clip { key: "crouch-idle-hold", fps: 5.0, frames: &[crouch(2, 3)] },
    Clip { key: "crouch-run-hold", fps: 5.0, frames: &[crouch(2, 3), crouch(3, 3)] },
    Clip {
        key: "dead",
        fps: 4.0,
        frames: &[stand(0, 5), stand(1, 5), stand(2, 5), crouch(3, 5)],
    },
];

pub const CANNON_IDLE: &str = "idle";
pub const CANNON_SELECTABLE: &str = "selectable";
pub const CANNON_FIRING: &str = "firing";

pub static CANNON_CLIPS: &[Clip] = &[
    Clip { key: "idle", fps: 4.0, frames: &[Frame::new(0, 0, 12, 12)] },
    Clip { key: "selectable", fps: 4.0, frames: &[Frame::new(1, 0, 12, 12)] },
    Clip {
        key: "firing",
        fps: 4.0,
        frames: &[
            Frame::new(0, 1, 12, 12),
            Frame::new(0, 2, 12, 12),
            Frame::new(0, 3, 12, 12),
            Frame::new(0, 4, 12, 12),
        ],
    },
];

/// Compose a pirate clip key from its state tokens, e.g. `crouch-run-hold`.
pub fn pirate_clip_key(crouched: bool, moving: bool, holding: bool) -> String {
    let mut key = String::new();
    if crouched {
        key.push_str(PIRATE_CROUCH);
        key.push('-');
    }
    key.push_str(if moving { PIRATE_RUN } else { PIRATE_IDLE });
    if holding {
        key.push('-');
        key.push_str(PIRATE_HOLD);
    }
    key
}

pub fn clip_duration(clips: &[Clip], key: &str) -> Option<f32> {
    clips.iter().find(|clip| clip.key == key).map(Clip::duration)
}

// ── Animator ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Animator {
    clips: &'static [Clip],
    selected: usize,
    last: usize,
    frame: usize,
    timer: f32,
    oneshot: bool,
    looping: bool,
    can_change: bool,
    pub flipped: bool,
}

impl Animator {
    pub fn new(clips: &'static [Clip]) -> Self {
        Self {
            clips,
            selected: 0,
            last: 0,
            frame: 0,
            timer: 0.0,
            oneshot: false,
            looping: true,
            can_change: true,
            flipped: false,
        }
    }

    pub fn selected_key(&self) -> &'static str {
        self.clips[self.selected].key
    }

    /// Switch clips. A one-shot clip falls back to the previous clip when it
    /// completes; a non-looping clip holds its last frame and locks out
    /// further changes. Returns whether the clip changed.
    pub fn set(&mut self, key: &str, oneshot: bool, looping: bool) -> bool {
        if key == self.selected_key() || !self.can_change {
            return false;
        }
        let Some(index) = self.clips.iter().position(|clip| clip.key == key) else {
            warn!(clip = key, "unknown animation clip");
            return false;
        };
        self.last = self.selected;
        self.selected = index;
        self.frame = 0;
        self.timer = 0.0;
        self.oneshot = oneshot;
        self.looping = looping;
        self.can_change = looping;
        true
    }

    /// Advance the clock, carrying leftover time into the next frame so a
    /// clip lasts exactly its duration whatever the step size.
    pub fn tick(&mut self, dt: f32) {
        self.timer += dt;
        loop {
            let clip = &self.clips[self.selected];
            let period = 1.0 / clip.fps;
            if self.timer < period {
                return;
            }
            self.timer -= period;
            self.frame += 1;
            if self.frame >= clip.frames.len() {
                self.frame = if self.looping { 0 } else { clip.frames.len() - 1 };
                if self.oneshot {
                    self.selected = self.last;
                    self.frame = 0;
                    self.oneshot = false;
                }
            }
        }
    }

    pub fn current_frame(&self) -> Frame {
        let frames = self.clips[self.selected].frames;
        frames[self.frame.min(frames.len() - 1)]
    }

    pub fn duration(&self, key: &str) -> Option<f32> {
        clip_duration(self.clips, key)
    }
}
