/// WorldState: the complete snapshot of a running session.
///
/// ## Session State
///
/// Score, lives, power-up and game-over live in one `Session` object
/// owned here, so reset atomicity is explicit: `Session::reset()`
/// restores all four fields in a single assignment and there is no
/// intermediate observable state.
///
/// ## Scheduled tasks
///
/// Delayed one-shots (damage tint clear, session restart) are stored
/// as tick-stamped entries keyed to `session_gen`. A session reset
/// bumps the generation, so a still-pending task from the previous
/// session is dropped instead of firing against the new session's
/// actors.
///
/// ## Camera / Viewport
///
/// World coordinates and screen coordinates are separate: the camera
/// holds the world position of the viewport's top-left corner plus the
/// viewport extent in world units (set by the renderer from the
/// terminal size). It follows the player center-locked, clamped to the
/// world box; a viewport larger than the world is centered.

use crate::config::TuningConfig;
use crate::domain::entity::{Coin, Enemy, Item, Player};
use crate::domain::solid::Solid;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    StageClear,
    GameOver,
}

/// Score, lives, power-up and game-over flags for one play-through.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Session {
    pub score: u32,
    pub lives: u32,
    pub power_up: bool,
    pub game_over: bool,
}

impl Session {
    pub const STARTING_LIVES: u32 = 3;

    pub fn new() -> Self {
        Session {
            score: 0,
            lives: Self::STARTING_LIVES,
            power_up: false,
            game_over: false,
        }
    }

    /// Restore all fields atomically (one assignment, no partial state).
    pub fn reset(&mut self) {
        *self = Session::new();
    }
}

/// What a delayed task does when its tick arrives.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ScheduledKind {
    /// Clear the player's damage tint.
    ClearTint,
    /// Tear the session down and rebuild the level.
    Restart,
}

/// A delayed one-shot, valid only for the generation that created it.
#[derive(Clone, Copy, Debug)]
pub struct Scheduled {
    pub fire_tick: u64,
    pub gen: u64,
    pub kind: ScheduledKind,
}

#[derive(Clone, Debug)]
pub struct Camera {
    /// World position of the top-left visible corner (can be negative
    /// when the viewport exceeds the world and the view is centered).
    pub x: f32,
    pub y: f32,
    /// Viewport extent in world units, set during render().
    pub view_w: f32,
    pub view_h: f32,
}

impl Camera {
    pub fn new() -> Self {
        Camera { x: 0.0, y: 0.0, view_w: 0.0, view_h: 0.0 }
    }

    /// Center-lock on a target, clamped to the world box.
    pub fn follow(&mut self, target_x: f32, target_y: f32, world_w: f32, world_h: f32) {
        if self.view_w <= 0.0 || self.view_h <= 0.0 { return; }

        if world_w <= self.view_w {
            self.x = -(self.view_w - world_w) / 2.0;
        } else {
            self.x = (target_x - self.view_w / 2.0).clamp(0.0, world_w - self.view_w);
        }

        if world_h <= self.view_h {
            self.y = -(self.view_h - world_h) / 2.0;
        } else {
            self.y = (target_y - self.view_h / 2.0).clamp(0.0, world_h - self.view_h);
        }
    }
}

pub struct WorldState {
    // ── Level geometry & actors ──
    pub solids: Vec<Solid>,
    pub coins: Vec<Coin>,
    pub enemies: Vec<Enemy>,
    pub items: Vec<Item>,
    pub player: Player,
    pub player_spawn: (f32, f32),

    // ── Session ──
    pub session: Session,
    pub phase: Phase,
    pub tick: u64,
    pub session_gen: u64,
    pub pending: Vec<Scheduled>,

    // ── Tuning (from config.toml) ──
    pub tuning: TuningConfig,

    // ── UI ──
    pub camera: Camera,
    pub message: String,
    pub message_timer: u32,
    pub paused: bool,
    pub anim_tick: u32,
    pub pad_connected: bool,
}

impl WorldState {
    pub fn new(tuning: TuningConfig) -> Self {
        WorldState {
            solids: vec![],
            coins: vec![],
            enemies: vec![],
            items: vec![],
            player: Player::new(0.0, 0.0),
            player_spawn: (0.0, 0.0),
            session: Session::new(),
            phase: Phase::Playing,
            tick: 0,
            session_gen: 0,
            pending: vec![],
            tuning,
            camera: Camera::new(),
            message: String::new(),
            message_timer: 0,
            paused: false,
            anim_tick: 0,
            pad_connected: false,
        }
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Queue a delayed task `delay_ms` from now, keyed to the current
    /// session generation.
    pub fn schedule(&mut self, kind: ScheduledKind, delay_ms: u64) {
        let delay_ticks = (delay_ms / self.tuning.tick_rate_ms.max(1)).max(1);
        self.pending.push(Scheduled {
            fire_tick: self.tick + delay_ticks,
            gen: self.session_gen,
            kind,
        });
    }

    /// Remove and return the tasks due at the current tick. Tasks from
    /// an older generation are silently discarded.
    pub fn take_due_tasks(&mut self) -> Vec<ScheduledKind> {
        let tick = self.tick;
        let gen = self.session_gen;
        let mut due = vec![];
        self.pending.retain(|t| {
            if t.gen != gen {
                false
            } else if t.fire_tick <= tick {
                due.push(t.kind);
                false
            } else {
                true
            }
        });
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_reset_restores_all_fields_at_once() {
        let mut s = Session::new();
        s.score = 4200;
        s.lives = 0;
        s.power_up = true;
        s.game_over = true;
        s.reset();
        assert_eq!(s, Session::new());
        assert_eq!(s.score, 0);
        assert_eq!(s.lives, 3);
        assert!(!s.power_up);
        assert!(!s.game_over);
    }

    #[test]
    fn scheduled_task_fires_at_its_tick() {
        let mut w = WorldState::new(TuningConfig::default());
        w.schedule(ScheduledKind::ClearTint, w.tuning.tick_rate_ms * 3);
        assert!(w.take_due_tasks().is_empty());
        w.tick += 3;
        assert_eq!(w.take_due_tasks(), vec![ScheduledKind::ClearTint]);
        assert!(w.pending.is_empty());
    }

    #[test]
    fn stale_generation_tasks_are_dropped() {
        let mut w = WorldState::new(TuningConfig::default());
        w.schedule(ScheduledKind::ClearTint, w.tuning.tick_rate_ms);
        w.session_gen += 1; // session reset happened in the meantime
        w.tick += 10;
        assert!(w.take_due_tasks().is_empty());
        assert!(w.pending.is_empty());
    }

    #[test]
    fn camera_clamps_to_world() {
        let mut cam = Camera::new();
        cam.view_w = 800.0;
        cam.view_h = 600.0;
        cam.follow(100.0, 300.0, 6400.0, 600.0);
        assert_eq!(cam.x, 0.0); // clamped at the left edge
        cam.follow(6350.0, 300.0, 6400.0, 600.0);
        assert_eq!(cam.x, 5600.0); // clamped at the right edge
        cam.follow(3200.0, 300.0, 6400.0, 600.0);
        assert_eq!(cam.x, 2800.0); // centered on the target
    }

    #[test]
    fn camera_centers_small_world() {
        let mut cam = Camera::new();
        cam.view_w = 1000.0;
        cam.view_h = 700.0;
        cam.follow(500.0, 300.0, 800.0, 600.0);
        assert_eq!(cam.x, -100.0);
        assert_eq!(cam.y, -50.0);
    }
}
