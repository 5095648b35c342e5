/// The level layout: one hard-coded stage, rebuilt identically on
/// every session start. All positions are literal world coordinates
/// (AABB centers); there is no randomness and no external level data.
///
/// Layout summary, left to right:
///   - a 6400-unit ground strip with three pit gaps
///   - seven named brick areas plus a 12-brick goal pole at x=5800
///   - 13 question blocks, each armed with one item
///   - 8 pipes standing on the ground
///   - 25 patrolling enemies
///   - 11 coin rows at 40-unit spacing

use crate::domain::entity::{Coin, Enemy, Player};
use crate::domain::solid::{Solid, SolidKind};
use crate::sim::world::{Phase, WorldState};

pub const TILE: f32 = 32.0;
pub const GROUND_Y: f32 = 568.0;
pub const GROUND_TILES: usize = 200;

/// Tile-index ranges left open as pits (inclusive).
pub const PIT_RANGES: [(usize, usize); 3] = [(35, 38), (70, 74), (120, 125)];

pub const PLAYER_SPAWN: (f32, f32) = (100.0, 450.0);

/// Crossing this x wins the stage.
pub const GOAL_X: f32 = 5800.0;

const QUESTION_BLOCKS: [(f32, f32); 13] = [
    (384.0, 300.0),
    (500.0, 300.0),
    (900.0, 300.0),
    (1350.0, 300.0),
    (1750.0, 250.0),
    (2100.0, 200.0),
    (2400.0, 300.0),
    (2800.0, 300.0),
    (3100.0, 200.0),
    (3500.0, 300.0),
    (4000.0, 300.0),
    (4500.0, 250.0),
    (5200.0, 250.0),
];

const PIPE_XS: [f32; 8] = [600.0, 1000.0, 1500.0, 2000.0, 2600.0, 3300.0, 4200.0, 4800.0];
const PIPE_Y: f32 = 504.0;

const ENEMY_XS: [f32; 25] = [
    400.0, 550.0, 750.0, 950.0, 1150.0, 1300.0, 1450.0, 1650.0, 1850.0, 2050.0,
    2250.0, 2450.0, 2650.0, 2850.0, 3050.0, 3300.0, 3550.0, 3800.0, 4050.0, 4300.0,
    4550.0, 4800.0, 5050.0, 5300.0, 5550.0,
];
const ENEMY_Y: f32 = 400.0;

/// Coin rows: (start x, count), laid at 40-unit spacing.
pub const COIN_ROWS: [(f32, usize); 11] = [
    (250.0, 8),
    (700.0, 10),
    (1100.0, 12),
    (1550.0, 8),
    (2100.0, 15),
    (2700.0, 10),
    (3200.0, 12),
    (3700.0, 8),
    (4100.0, 10),
    (4600.0, 8),
    (5100.0, 15),
];
const COIN_SPACING: f32 = 40.0;
const COIN_Y: f32 = 450.0;

fn in_pit(tile: usize) -> bool {
    PIT_RANGES.iter().any(|&(lo, hi)| tile >= lo && tile <= hi)
}

/// Build the stage into `world`, replacing any previous geometry and
/// actors. Deterministic; the result is identical every call.
pub fn build(world: &mut WorldState) {
    world.solids.clear();
    world.coins.clear();
    world.enemies.clear();
    world.items.clear();

    // ── Ground strip with pit gaps ──
    for i in 0..GROUND_TILES {
        if in_pit(i) { continue; }
        world.solids.push(Solid::new(SolidKind::Ground, i as f32 * TILE, GROUND_Y));
    }

    // ── Brick areas ──
    fn brick(world: &mut WorldState, x: f32, y: f32) {
        world.solids.push(Solid::new(SolidKind::Brick, x, y));
    }

    // Area 1: opening row, plus one floater above it
    for i in 0..4 {
        brick(world, 320.0 + i as f32 * TILE, 300.0);
    }
    brick(world, 352.0, 200.0);

    // Area 2: three-step staircase rising from the ground
    for i in 0..3 {
        for j in 0..=i {
            brick(world, 800.0 + i as f32 * TILE, GROUND_Y - j as f32 * TILE);
        }
    }

    // Area 3: floating row
    for i in 0..8 {
        brick(world, 1200.0 + i as f32 * TILE, 300.0);
    }

    // Area 4: two offset rows
    for i in 0..5 {
        brick(world, 1600.0 + i as f32 * TILE, 350.0);
    }
    for i in 0..3 {
        brick(world, 1700.0 + i as f32 * TILE, 250.0);
    }

    // Area 5: long floating row
    for i in 0..10 {
        brick(world, 2200.0 + i as f32 * TILE, 300.0);
    }

    // Area 6: row with a doubled middle section
    for i in 0..6 {
        brick(world, 3000.0 + i as f32 * TILE, 300.0);
        if (2..=4).contains(&i) {
            brick(world, 3000.0 + i as f32 * TILE, 200.0);
        }
    }

    // Area 7: approach row before the goal
    for i in 0..15 {
        brick(world, 5000.0 + i as f32 * TILE, 250.0);
    }

    // Goal pole: 12 bricks stacked at the finish line
    for i in 0..12 {
        brick(world, GOAL_X, GROUND_Y - i as f32 * TILE);
    }

    // ── Question blocks ──
    for &(x, y) in &QUESTION_BLOCKS {
        world.solids.push(Solid::new(SolidKind::Question, x, y));
    }

    // ── Pipes ──
    for &x in &PIPE_XS {
        world.solids.push(Solid::new(SolidKind::Pipe, x, PIPE_Y));
    }

    // ── Enemies ──
    let patrol = -world.tuning.enemy_speed;
    for &x in &ENEMY_XS {
        world.enemies.push(Enemy::new(x, ENEMY_Y, patrol));
    }

    // ── Coins ──
    for &(start, count) in &COIN_ROWS {
        for i in 0..count {
            world.coins.push(Coin::new(start + i as f32 * COIN_SPACING, COIN_Y));
        }
    }

    // ── Player ──
    world.player = Player::new(PLAYER_SPAWN.0, PLAYER_SPAWN.1);
    world.player_spawn = PLAYER_SPAWN;
    world.phase = Phase::Playing;
    world.camera.follow(
        PLAYER_SPAWN.0,
        PLAYER_SPAWN.1,
        crate::domain::physics::WORLD_W,
        crate::domain::physics::WORLD_H,
    );
}
