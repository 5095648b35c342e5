/// Arcade physics: gravity integration and axis-separated AABB
/// resolution against static solids.
///
/// ## Architecture
///
/// One call per actor per tick:
///   1. Apply gravity to vy
///   2. Move along x, push out of any overlapped solid, set
///      blocked_left / blocked_right
///   3. Move along y, push out, set on_ground (floor) or hit_head
///      (ceiling, with the index of the struck solid)
///   4. Clamp to world bounds; the bottom edge counts as standing
///      ground, so a pit floor can be jumped out of
///
/// Resolving x before y is what lets a walking actor cross tile seams
/// without snagging: while standing, the body's bottom edge exactly
/// meets the tile top and the strict overlap test excludes it from the
/// horizontal pass.
///
/// ## Contact Truth Table
/// ┌───────────────────────────────┬──────────────────────────────┐
/// │ Condition                      │ Result                       │
/// ├───────────────────────────────┼──────────────────────────────┤
/// │ moving right, solid overlap    │ blocked_right, x pushed left │
/// │ moving left, solid overlap     │ blocked_left, x pushed right │
/// │ moving down, solid overlap     │ on_ground, vy→0 (or bounce)  │
/// │ moving up, solid overlap       │ hit_head + head_solid, vy→0  │
/// │ x at world edge                │ blocked_left / blocked_right │
/// │ bottom at world edge           │ on_ground, vy→0 (or bounce)  │
/// │ top at world edge              │ vy→0                         │
/// └───────────────────────────────┴──────────────────────────────┘
///
/// `halt_on_wall` controls whether a horizontal block zeroes vx
/// (player, item) or preserves it for the patrol controller to
/// reverse (enemy).

use super::entity::{Body, Contacts};
use super::solid::Solid;

/// Fixed world extents. All geometry and actors live inside this box.
pub const WORLD_W: f32 = 6400.0;
pub const WORLD_H: f32 = 600.0;

/// Below this downward speed a restitution bounce settles to rest.
const SETTLE_SPEED: f32 = 40.0;

/// Per-actor integration policy.
#[derive(Clone, Copy, Debug)]
pub struct MoveStyle {
    /// Vertical restitution on floor contact (0 = no bounce).
    pub restitution: f32,
    /// Zero vx on a horizontal block instead of preserving it.
    pub halt_on_wall: bool,
}

impl MoveStyle {
    /// Player and item: stop dead against walls.
    pub const SLIDE: MoveStyle = MoveStyle { restitution: 0.0, halt_on_wall: true };
    /// Enemy patrol: keep vx so the controller can reverse it.
    pub const PATROL: MoveStyle = MoveStyle { restitution: 0.0, halt_on_wall: false };

    /// Bouncing body (coins settle with restitution 0.3).
    pub fn bouncy(restitution: f32) -> MoveStyle {
        MoveStyle { restitution, halt_on_wall: true }
    }
}

/// Advance one body by dt against the level geometry.
/// Returns the contact flags observed during this step.
pub fn integrate(
    body: &mut Body,
    solids: &[Solid],
    dt: f32,
    gravity: f32,
    style: MoveStyle,
) -> Contacts {
    let mut contacts = Contacts::default();

    body.vy += gravity * dt;

    // ── Horizontal pass ──
    let dx = body.vx * dt;
    if dx != 0.0 {
        body.x += dx;
        for s in solids {
            if !s.overlaps(body) { continue; }
            if dx > 0.0 {
                body.x = s.left() - body.hw;
                contacts.blocked_right = true;
            } else {
                body.x = s.right() + body.hw;
                contacts.blocked_left = true;
            }
            if style.halt_on_wall { body.vx = 0.0; }
        }
    }

    // World bounds, x
    if body.x < body.hw {
        body.x = body.hw;
        contacts.blocked_left = true;
        if style.halt_on_wall { body.vx = 0.0; }
    } else if body.x > WORLD_W - body.hw {
        body.x = WORLD_W - body.hw;
        contacts.blocked_right = true;
        if style.halt_on_wall { body.vx = 0.0; }
    }

    // ── Vertical pass ──
    let dy = body.vy * dt;
    if dy > 0.0 {
        body.y += dy;
        for s in solids {
            if !s.overlaps(body) { continue; }
            body.y = s.top() - body.hh;
            land(body, &mut contacts, style);
        }
    } else if dy < 0.0 {
        body.y += dy;
        // Several question blocks sit co-located with bricks; all
        // overlaps are gathered before push-out so the question block
        // claims the bump.
        let mut struck: Option<usize> = None;
        let mut push_to = f32::NEG_INFINITY;
        for (i, s) in solids.iter().enumerate() {
            if !s.overlaps(body) { continue; }
            push_to = push_to.max(s.bottom());
            let replace = match struck {
                None => true,
                Some(prev) => s.is_question() && !solids[prev].is_question(),
            };
            if replace { struck = Some(i); }
        }
        if struck.is_some() {
            body.y = push_to + body.hh;
            body.vy = 0.0;
            contacts.hit_head = true;
            contacts.head_solid = struck;
        }
    }

    // World bounds, y: bottom edge is standable ground
    if body.y > WORLD_H - body.hh {
        body.y = WORLD_H - body.hh;
        land(body, &mut contacts, style);
    } else if body.y < body.hh {
        body.y = body.hh;
        if body.vy < 0.0 { body.vy = 0.0; }
    }

    contacts
}

fn land(body: &mut Body, contacts: &mut Contacts, style: MoveStyle) {
    contacts.on_ground = true;
    if style.restitution > 0.0 && body.vy * style.restitution > SETTLE_SPEED {
        body.vy = -body.vy * style.restitution;
    } else {
        body.vy = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::solid::SolidKind;

    const DT: f32 = 0.016;
    const GRAVITY: f32 = 1000.0;

    /// A strip of ground tiles at the stage floor height (y=568).
    fn floor(tile_range: std::ops::Range<i32>) -> Vec<Solid> {
        tile_range
            .map(|i| Solid::new(SolidKind::Ground, i as f32 * 32.0, 568.0))
            .collect()
    }

    fn settle(body: &mut Body, solids: &[Solid], style: MoveStyle) -> Contacts {
        let mut c = Contacts::default();
        for _ in 0..200 {
            c = integrate(body, solids, DT, GRAVITY, style);
        }
        c
    }

    #[test]
    fn falls_under_gravity() {
        let solids = floor(0..8);
        let mut body = Body::new(100.0, 450.0, 6.0, 12.0);
        let c = integrate(&mut body, &solids, DT, GRAVITY, MoveStyle::SLIDE);
        assert!(body.y > 450.0);
        assert!(body.vy > 0.0);
        assert!(!c.on_ground);
    }

    #[test]
    fn lands_on_ground_and_stays() {
        let solids = floor(0..8);
        let mut body = Body::new(100.0, 450.0, 6.0, 12.0);
        let c = settle(&mut body, &solids, MoveStyle::SLIDE);
        assert!(c.on_ground);
        assert_eq!(body.vy, 0.0);
        // Resting with feet on the tile top (568 - 16 = 552)
        assert!((body.bottom() - 552.0).abs() < 0.001);
    }

    #[test]
    fn walks_across_tile_seams_without_snagging() {
        let solids = floor(0..8);
        let mut body = Body::new(40.0, 540.0, 6.0, 12.0);
        settle(&mut body, &solids, MoveStyle::SLIDE);
        body.vx = 200.0;
        for _ in 0..20 {
            body.vx = 200.0;
            let c = integrate(&mut body, &solids, DT, GRAVITY, MoveStyle::SLIDE);
            assert!(!c.blocked_right, "snagged at x={}", body.x);
        }
        assert!(body.x > 90.0);
    }

    #[test]
    fn wall_blocks_and_halts() {
        let mut solids = floor(0..8);
        solids.push(Solid::new(SolidKind::Pipe, 128.0, 504.0));
        let mut body = Body::new(60.0, 540.0, 6.0, 12.0);
        settle(&mut body, &solids, MoveStyle::SLIDE);
        let mut blocked = false;
        for _ in 0..60 {
            body.vx = 200.0;
            let c = integrate(&mut body, &solids, DT, GRAVITY, MoveStyle::SLIDE);
            if c.blocked_right { blocked = true; break; }
        }
        assert!(blocked);
        assert_eq!(body.vx, 0.0);
        // Flush against the pipe's left face (128 - 32 = 96)
        assert!((body.right() - 96.0).abs() < 0.001);
    }

    #[test]
    fn patrol_block_preserves_velocity() {
        let mut solids = floor(0..8);
        solids.push(Solid::new(SolidKind::Pipe, 128.0, 504.0));
        let mut body = Body::new(60.0, 540.0, 10.0, 12.0);
        body.vx = 50.0;
        settle(&mut body, &solids, MoveStyle::PATROL);
        // Pressed against the pipe, vx untouched for the controller
        assert_eq!(body.vx, 50.0);
    }

    #[test]
    fn world_edge_sets_blocked_flag() {
        let solids = floor(0..4);
        let mut body = Body::new(10.5, 540.0, 10.0, 12.0);
        body.vx = -50.0;
        let c = integrate(&mut body, &solids, DT, GRAVITY, MoveStyle::PATROL);
        assert!(c.blocked_left);
        assert_eq!(body.x, 10.0);
        assert_eq!(body.vx, -50.0);
    }

    #[test]
    fn ceiling_bump_reports_struck_solid() {
        let mut solids = floor(0..8);
        solids.push(Solid::new(SolidKind::Question, 96.0, 300.0));
        let qi = solids.len() - 1;
        let mut body = Body::new(96.0, 340.0, 6.0, 12.0);
        body.vy = -500.0;
        let mut head = None;
        for _ in 0..20 {
            let c = integrate(&mut body, &solids, DT, GRAVITY, MoveStyle::SLIDE);
            if c.hit_head {
                head = c.head_solid;
                break;
            }
        }
        assert_eq!(head, Some(qi));
        // Pushed flush under the block (316 + 12 = 328)
        assert!((body.top() - 316.0).abs() < 0.001);
    }

    #[test]
    fn bump_prefers_question_over_colocated_brick() {
        // The layout embeds question blocks inside brick rows at the
        // same coordinates; the bump must report the question block.
        let mut solids = floor(0..8);
        solids.push(Solid::new(SolidKind::Brick, 96.0, 300.0));
        solids.push(Solid::new(SolidKind::Question, 96.0, 300.0));
        let qi = solids.len() - 1;
        let mut body = Body::new(96.0, 340.0, 6.0, 12.0);
        body.vy = -500.0;
        let mut head = None;
        for _ in 0..20 {
            let c = integrate(&mut body, &solids, DT, GRAVITY, MoveStyle::SLIDE);
            if c.hit_head {
                head = c.head_solid;
                break;
            }
        }
        assert_eq!(head, Some(qi));
    }

    #[test]
    fn pit_floor_is_standable() {
        // No tiles below: body falls to the world's bottom edge and
        // lands there, so a jump impulse can carry it back out.
        let solids: Vec<Solid> = vec![];
        let mut body = Body::new(1200.0, 560.0, 6.0, 12.0);
        let c = settle(&mut body, &solids, MoveStyle::SLIDE);
        assert!(c.on_ground);
        assert_eq!(body.bottom(), WORLD_H);
    }

    #[test]
    fn bounce_decays_to_rest() {
        let solids = floor(10..20);
        let mut body = Body::new(400.0, 450.0, 12.0, 12.0);
        let mut bounced = false;
        let mut prev_vy = 0.0_f32;
        for _ in 0..400 {
            let c = integrate(&mut body, &solids, DT, GRAVITY, MoveStyle::bouncy(0.3));
            if c.on_ground && body.vy < 0.0 {
                bounced = true;
                assert!(body.vy.abs() <= prev_vy.abs() + 0.001);
            }
            prev_vy = body.vy;
        }
        assert!(bounced);
        assert_eq!(body.vy, 0.0);
        assert!((body.bottom() - 552.0).abs() < 0.001);
    }
}
