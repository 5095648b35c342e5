/// Entities: Player, Enemy, power-up Item, Coin.
///
/// All dynamic actors share a `Body` (center position + velocity +
/// collision half-extents) and a `Contacts` record filled in by the
/// physics pass each tick. Collision boxes are smaller than the drawn
/// sprites; sprite dimensions live in the ui layer.

/// Per-frame logical input, independent of source device.
/// Left and right may both be set; the controller tests left first.
#[derive(Clone, Copy, Debug, Default)]
pub struct Intent {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

/// Axis-aligned body: center position, velocity, half-extents.
#[derive(Clone, Copy, Debug)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub hw: f32,
    pub hh: f32,
}

impl Body {
    pub fn new(x: f32, y: f32, hw: f32, hh: f32) -> Self {
        Body { x, y, vx: 0.0, vy: 0.0, hw, hh }
    }

    pub fn left(&self) -> f32 { self.x - self.hw }
    pub fn right(&self) -> f32 { self.x + self.hw }
    pub fn top(&self) -> f32 { self.y - self.hh }
    pub fn bottom(&self) -> f32 { self.y + self.hh }

    /// AABB overlap test against another body.
    pub fn overlaps(&self, other: &Body) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

/// Contact state reported by the physics pass for one tick.
/// `head_solid` identifies which solid blocked an upward move,
/// for question-block bump dispatch.
#[derive(Clone, Copy, Debug, Default)]
pub struct Contacts {
    pub on_ground: bool,
    pub blocked_left: bool,
    pub blocked_right: bool,
    pub hit_head: bool,
    pub head_solid: Option<usize>,
}

// ── Collision half-extents ──
// Player sprite is 16x28 but collides with a reduced 12x24 box.
// Enemy sprite is 24x28, box 20x24.

pub const PLAYER_HALF_W: f32 = 6.0;
pub const PLAYER_HALF_H: f32 = 12.0;
pub const ENEMY_HALF_W: f32 = 10.0;
pub const ENEMY_HALF_H: f32 = 12.0;
pub const ITEM_HALF_W: f32 = 16.0;
pub const ITEM_HALF_H: f32 = 14.0;
pub const COIN_HALF_W: f32 = 12.0;
pub const COIN_HALF_H: f32 = 12.0;

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
    pub alive: bool,
    /// Power-up state: one free hit absorption + enlarged sprite.
    pub powered: bool,
    /// Visual tint override (damage flash). Cleared by a scheduled task.
    pub tint: Option<[u8; 3]>,
    /// Sprite scale override: 1.2 while powered, 1.0 otherwise.
    pub scale: f32,
    pub contacts: Contacts,
}

impl Player {
    pub fn new(x: f32, y: f32) -> Self {
        Player {
            body: Body::new(x, y, PLAYER_HALF_W, PLAYER_HALF_H),
            alive: true,
            powered: false,
            tint: None,
            scale: 1.0,
            contacts: Contacts::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub body: Body,
    pub alive: bool,
    pub contacts: Contacts,
}

impl Enemy {
    pub fn new(x: f32, y: f32, vx: f32) -> Self {
        let mut body = Body::new(x, y, ENEMY_HALF_W, ENEMY_HALF_H);
        body.vx = vx;
        Enemy { body, alive: true, contacts: Contacts::default() }
    }
}

/// Power-up item (mushroom). Spawned above a struck question block,
/// drifts right, collides with level geometry.
#[derive(Clone, Debug)]
pub struct Item {
    pub body: Body,
    pub alive: bool,
    pub contacts: Contacts,
}

impl Item {
    pub fn new(x: f32, y: f32, vx: f32) -> Self {
        let mut body = Body::new(x, y, ITEM_HALF_W, ITEM_HALF_H);
        body.vx = vx;
        Item { body, alive: true, contacts: Contacts::default() }
    }
}

#[derive(Clone, Debug)]
pub struct Coin {
    pub body: Body,
    pub alive: bool,
}

impl Coin {
    pub fn new(x: f32, y: f32) -> Self {
        Coin { body: Body::new(x, y, COIN_HALF_W, COIN_HALF_H), alive: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_edges() {
        let b = Body::new(100.0, 50.0, 6.0, 12.0);
        assert_eq!(b.left(), 94.0);
        assert_eq!(b.right(), 106.0);
        assert_eq!(b.top(), 38.0);
        assert_eq!(b.bottom(), 62.0);
    }

    #[test]
    fn overlap_symmetric() {
        let a = Body::new(0.0, 0.0, 10.0, 10.0);
        let b = Body::new(15.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Body::new(0.0, 0.0, 10.0, 10.0);
        let b = Body::new(20.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn player_starts_unpowered() {
        let p = Player::new(100.0, 450.0);
        assert!(p.alive);
        assert!(!p.powered);
        assert_eq!(p.scale, 1.0);
        assert!(p.tint.is_none());
    }

    #[test]
    fn enemy_spawns_with_patrol_velocity() {
        let e = Enemy::new(400.0, 400.0, -50.0);
        assert_eq!(e.body.vx, -50.0);
        assert!(e.alive);
    }
}
