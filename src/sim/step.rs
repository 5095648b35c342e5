/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Scheduled-task drain (tint clear, delayed restart)
///   2. Player control (intent → velocity, jump)
///   3. Enemy patrol reversal (from last tick's blocked flags)
///   4. Physics integration (player → enemies → items → coins)
///   5. Contact collection (typed queue)
///   6. Encounter resolution (mutates session, emits events)
///   7. Goal check
///
/// Phases other than Playing freeze steps 2-7; only the scheduled-task
/// drain keeps running so a pending restart can fire. Once the session
/// is game-over, encounter resolution refuses all further score/life
/// mutation until the restart resets the session.

use crate::domain::entity::{Intent, Item};
use crate::domain::physics::{self, MoveStyle};
use crate::domain::rules::{self, DamageOutcome};
use crate::sim::event::{Contact, GameEvent};
use crate::sim::level;
use crate::sim::world::{Phase, ScheduledKind, WorldState};

const DAMAGE_TINT: [u8; 3] = [255, 0, 0];
const POWERED_SCALE: f32 = 1.2;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, intent: Intent) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;
    world.anim_tick = world.anim_tick.wrapping_add(1);

    if world.message_timer > 0 {
        world.message_timer -= 1;
        if world.message_timer == 0 { world.message.clear(); }
    }

    run_scheduled(world, &mut events);

    if world.phase != Phase::Playing { return events; }

    apply_player_control(world, intent, &mut events);
    apply_enemy_patrol(world);
    integrate_actors(world);
    let contacts = collect_contacts(world);
    resolve_encounters(world, &contacts, &mut events);
    resolve_goal(world, &mut events);

    events
}

/// Tear the session down and rebuild the stage. Bumping the generation
/// first makes any still-pending delayed task from the old session
/// stale, so it can never touch the new session's actors.
pub fn restart_session(world: &mut WorldState) {
    world.session_gen += 1;
    world.pending.clear();
    world.session.reset();
    level::build(world);
    world.message.clear();
    world.message_timer = 0;
}

// ══════════════════════════════════════════════════════════════
// Scheduled tasks
// ══════════════════════════════════════════════════════════════

fn run_scheduled(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    for kind in world.take_due_tasks() {
        match kind {
            ScheduledKind::ClearTint => {
                world.player.tint = None;
            }
            ScheduledKind::Restart => {
                restart_session(world);
                events.push(GameEvent::SessionReset);
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Control
// ══════════════════════════════════════════════════════════════

/// Left is tested first, so simultaneous left+right resolves left.
/// The jump impulse fires only from the ground, per last tick's
/// contact state — no mid-air re-jump.
fn apply_player_control(world: &mut WorldState, intent: Intent, events: &mut Vec<GameEvent>) {
    let run = world.tuning.run_speed;
    let jump = world.tuning.jump_speed;
    let p = &mut world.player;
    if !p.alive { return; }

    if intent.left {
        p.body.vx = -run;
    } else if intent.right {
        p.body.vx = run;
    } else {
        p.body.vx = 0.0;
    }

    if intent.jump && p.contacts.on_ground {
        p.body.vy = -jump;
        events.push(GameEvent::Jumped);
    }
}

/// Wall/edge bounce: a blocked side from the last physics pass flips
/// the patrol direction. Enemy-enemy reversal is a separate trigger,
/// handled in encounter resolution.
fn apply_enemy_patrol(world: &mut WorldState) {
    for e in &mut world.enemies {
        if !e.alive { continue; }
        if e.contacts.blocked_left || e.contacts.blocked_right {
            e.body.vx = -e.body.vx;
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Physics
// ══════════════════════════════════════════════════════════════

fn integrate_actors(world: &mut WorldState) {
    let dt = world.tuning.dt();
    let gravity = world.tuning.gravity;

    if world.player.alive {
        world.player.contacts = physics::integrate(
            &mut world.player.body, &world.solids, dt, gravity, MoveStyle::SLIDE,
        );
    }

    for e in &mut world.enemies {
        if !e.alive { continue; }
        e.contacts = physics::integrate(&mut e.body, &world.solids, dt, gravity, MoveStyle::PATROL);
    }

    for item in &mut world.items {
        if !item.alive { continue; }
        item.contacts = physics::integrate(&mut item.body, &world.solids, dt, gravity, MoveStyle::SLIDE);
    }

    let bounce = MoveStyle::bouncy(world.tuning.coin_restitution);
    for c in &mut world.coins {
        if !c.alive { continue; }
        physics::integrate(&mut c.body, &world.solids, dt, gravity, bounce);
    }
}

// ══════════════════════════════════════════════════════════════
// Contact collection
// ══════════════════════════════════════════════════════════════

fn collect_contacts(world: &WorldState) -> Vec<Contact> {
    let mut contacts = Vec::new();
    let pb = &world.player.body;

    if let Some(i) = world.player.contacts.head_solid {
        contacts.push(Contact::PlayerBlock(i));
    }

    for (i, c) in world.coins.iter().enumerate() {
        if c.alive && c.body.overlaps(pb) {
            contacts.push(Contact::PlayerCoin(i));
        }
    }

    for (i, item) in world.items.iter().enumerate() {
        if item.alive && item.body.overlaps(pb) {
            contacts.push(Contact::PlayerItem(i));
        }
    }

    for (i, e) in world.enemies.iter().enumerate() {
        if e.alive && e.body.overlaps(pb) {
            contacts.push(Contact::PlayerEnemy(i));
        }
    }

    let n = world.enemies.len();
    for i in 0..n {
        if !world.enemies[i].alive { continue; }
        for j in (i + 1)..n {
            if !world.enemies[j].alive { continue; }
            if world.enemies[i].body.overlaps(&world.enemies[j].body) {
                contacts.push(Contact::EnemyEnemy(i, j));
            }
        }
    }

    contacts
}

// ══════════════════════════════════════════════════════════════
// Encounter resolution
// ══════════════════════════════════════════════════════════════

fn resolve_encounters(world: &mut WorldState, contacts: &[Contact], events: &mut Vec<GameEvent>) {
    for &contact in contacts {
        // Game-over latch: no further score/life mutation this session.
        if world.session.game_over { break; }

        match contact {
            Contact::PlayerCoin(i) => {
                if !world.coins[i].alive { continue; }
                world.coins[i].alive = false;
                world.session.score += 100;
                let (x, y) = (world.coins[i].body.x, world.coins[i].body.y);
                events.push(GameEvent::CoinCollected { x, y });
            }
            Contact::PlayerBlock(i) => resolve_block_bump(world, i, events),
            Contact::PlayerItem(i) => {
                if !world.items[i].alive { continue; }
                world.items[i].alive = false;
                world.session.score += 1000;
                world.session.power_up = true;
                world.player.scale = POWERED_SCALE;
                events.push(GameEvent::PowerUpCollected);
            }
            Contact::PlayerEnemy(i) => resolve_enemy_hit(world, i, events),
            Contact::EnemyEnemy(i, j) => resolve_enemy_pair(world, i, j),
        }
    }
}

/// An upward bump against an armed question block yields its item:
/// the flag flips off permanently, the score ticks up, and a power-up
/// item appears one tile above with rightward velocity.
fn resolve_block_bump(world: &mut WorldState, idx: usize, events: &mut Vec<GameEvent>) {
    let armed = world.solids[idx].is_question() && world.solids[idx].item_armed;
    if !rules::block_yields_item(armed, true) { return; }

    world.solids[idx].take_item();
    let (bx, by) = (world.solids[idx].x, world.solids[idx].y);
    world.session.score += 200;
    events.push(GameEvent::BlockBumped { x: bx, y: by });

    let spawn_y = by - level::TILE;
    world.items.push(Item::new(bx, spawn_y, world.tuning.item_speed));
    events.push(GameEvent::ItemSpawned { x: bx, y: spawn_y });
}

fn resolve_enemy_hit(world: &mut WorldState, i: usize, events: &mut Vec<GameEvent>) {
    if !world.enemies[i].alive || !world.player.alive { return; }

    let pvy = world.player.body.vy;
    let py = world.player.body.y;
    let ey = world.enemies[i].body.y;

    if rules::is_stomp(pvy, py, ey) {
        let (x, y) = (world.enemies[i].body.x, ey);
        world.enemies[i].alive = false;
        world.player.body.vy = -world.tuning.stomp_bounce;
        world.session.score += 200;
        events.push(GameEvent::EnemyStomped { x, y });
        return;
    }

    events.push(GameEvent::PlayerDamaged);
    match rules::damage_outcome(world.session.power_up, world.session.lives) {
        DamageOutcome::PowerLost => {
            world.session.power_up = false;
            world.player.scale = 1.0;
            flash_damage_tint(world);
        }
        DamageOutcome::LifeLost => {
            world.session.lives -= 1;
            flash_damage_tint(world);
            world.player.body.x = world.player_spawn.0;
            world.player.body.y = world.player_spawn.1;
        }
        DamageOutcome::GameOver => {
            world.session.lives = 0;
            world.session.game_over = true;
            world.phase = Phase::GameOver;
            world.player.tint = Some(DAMAGE_TINT);
            world.player.body.vx = 0.0;
            world.player.body.vy = 0.0;
            world.set_message("GAME OVER", 0);
            events.push(GameEvent::GameOverStarted);
            let delay = world.tuning.restart_delay_ms;
            world.schedule(ScheduledKind::Restart, delay);
        }
    }
}

fn flash_damage_tint(world: &mut WorldState) {
    world.player.tint = Some(DAMAGE_TINT);
    let flash = world.tuning.tint_flash_ms;
    world.schedule(ScheduledKind::ClearTint, flash);
}

/// Direct enemy-enemy contact reverses both participants. They are
/// also pushed apart so the same pair does not re-trigger every tick.
fn resolve_enemy_pair(world: &mut WorldState, i: usize, j: usize) {
    let (head, tail) = world.enemies.split_at_mut(j);
    let a = &mut head[i];
    let b = &mut tail[0];
    if !a.alive || !b.alive { return; }

    a.body.vx = -a.body.vx;
    b.body.vx = -b.body.vx;

    let gap = (a.body.hw + b.body.hw) - (a.body.x - b.body.x).abs();
    if gap > 0.0 {
        let push = gap / 2.0;
        if a.body.x <= b.body.x {
            a.body.x -= push;
            b.body.x += push;
        } else {
            a.body.x += push;
            b.body.x -= push;
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Goal
// ══════════════════════════════════════════════════════════════

fn resolve_goal(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.session.game_over { return; }
    if world.player.body.x >= level::GOAL_X {
        world.session.game_over = true;
        world.phase = Phase::StageClear;
        world.player.body.vx = 0.0;
        world.player.body.vy = 0.0;
        let msg = format!("STAGE CLEAR!  SCORE: {}", world.session.score);
        world.set_message(&msg, 0);
        events.push(GameEvent::StageCleared);
        let delay = world.tuning.restart_delay_ms;
        world.schedule(ScheduledKind::Restart, delay);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TuningConfig;
    use crate::domain::entity::Enemy;
    use crate::sim::world::Session;

    fn fresh_world() -> WorldState {
        let mut w = WorldState::new(TuningConfig::default());
        level::build(&mut w);
        w
    }

    fn idle() -> Intent {
        Intent::default()
    }

    /// Ticks needed for a scheduled delay of `ms` to elapse.
    fn ticks_for(w: &WorldState, ms: u64) -> u64 {
        (ms / w.tuning.tick_rate_ms).max(1) + 1
    }

    fn place_player(w: &mut WorldState, x: f32, y: f32) {
        w.player.body.x = x;
        w.player.body.y = y;
        w.player.body.vx = 0.0;
        w.player.body.vy = 0.0;
    }

    // ── Coins ──

    #[test]
    fn coin_scores_exactly_once() {
        let mut w = fresh_world();
        place_player(&mut w, 250.0, 450.0);
        step(&mut w, idle());
        assert_eq!(w.session.score, 100);
        assert!(!w.coins[0].alive);

        // Player and dead coin settle together; no second increment
        for _ in 0..50 {
            step(&mut w, idle());
        }
        assert_eq!(w.session.score, 100);
        assert_eq!(w.session.lives, 3);
    }

    #[test]
    fn first_coin_row_scores_800() {
        let mut w = fresh_world();
        for k in 0..8 {
            place_player(&mut w, 250.0 + k as f32 * 40.0, 450.0);
            step(&mut w, idle());
        }
        assert_eq!(w.session.score, 800);
        assert_eq!(w.session.lives, 3);
        assert!(w.coins[..8].iter().all(|c| !c.alive));
    }

    // ── Question blocks ──

    fn bump_block(w: &mut WorldState, bx: f32) -> Vec<GameEvent> {
        place_player(w, bx, 340.0);
        w.player.body.vy = -500.0;
        let mut all = vec![];
        for _ in 0..4 {
            all.extend(step(w, idle()));
        }
        all
    }

    #[test]
    fn question_block_yields_item_once() {
        let mut w = fresh_world();
        let qi = w.solids.iter().position(|s| s.is_question()).unwrap();
        assert_eq!(w.solids[qi].x, 384.0);

        let events = bump_block(&mut w, 384.0);
        assert_eq!(w.session.score, 200);
        assert!(!w.solids[qi].item_armed);
        assert!(w.solids[qi].is_spent());
        assert_eq!(w.items.len(), 1);
        assert!(events.iter().any(|e| matches!(e, GameEvent::BlockBumped { .. })));
        assert!(events.iter().any(|e| matches!(e, GameEvent::ItemSpawned { .. })));

        // Repeated airborne hits never fire again
        bump_block(&mut w, 384.0);
        assert_eq!(w.session.score, 200);
        assert_eq!(w.items.len(), 1);
    }

    #[test]
    fn spawned_item_moves_right_with_gravity() {
        let mut w = fresh_world();
        bump_block(&mut w, 384.0);
        let spawn_x = w.items[0].body.x;
        assert_eq!(w.items[0].body.vx, w.tuning.item_speed);
        for _ in 0..10 {
            step(&mut w, idle());
        }
        assert!(w.items[0].body.x > spawn_x);
    }

    #[test]
    fn collecting_item_grants_power_up() {
        let mut w = fresh_world();
        bump_block(&mut w, 384.0);
        let (ix, iy) = (w.items[0].body.x, w.items[0].body.y);
        place_player(&mut w, ix, iy);
        let events = step(&mut w, idle());
        assert!(!w.items[0].alive);
        assert!(w.session.power_up);
        assert_eq!(w.session.score, 200 + 1000);
        assert_eq!(w.player.scale, POWERED_SCALE);
        assert!(events.iter().any(|e| matches!(e, GameEvent::PowerUpCollected)));
    }

    // ── Enemies ──

    /// One enemy standing on the ground at x, everything else cleared.
    fn lone_enemy_world(x: f32) -> WorldState {
        let mut w = fresh_world();
        w.enemies.clear();
        w.enemies.push(Enemy::new(x, 540.0, -w.tuning.enemy_speed));
        w.coins.clear();
        w
    }

    #[test]
    fn stomp_kills_enemy_without_losing_a_life() {
        let mut w = lone_enemy_world(400.0);
        place_player(&mut w, 400.0, 515.0);
        w.player.body.vy = 50.0;
        let mut stomped = false;
        for _ in 0..10 {
            let events = step(&mut w, idle());
            if events.iter().any(|e| matches!(e, GameEvent::EnemyStomped { .. })) {
                stomped = true;
                break;
            }
        }
        assert!(stomped);
        assert!(!w.enemies[0].alive);
        assert_eq!(w.session.score, 200);
        assert_eq!(w.session.lives, 3);
        // Stomp bounce
        assert_eq!(w.player.body.vy, -w.tuning.stomp_bounce);
    }

    #[test]
    fn side_hit_costs_a_life_and_respawns() {
        let mut w = lone_enemy_world(400.0);
        place_player(&mut w, 400.0, 540.0);
        let events = step(&mut w, idle());
        assert!(events.iter().any(|e| matches!(e, GameEvent::PlayerDamaged)));
        assert_eq!(w.session.lives, 2);
        assert_eq!(w.player.body.x, 100.0);
        assert_eq!(w.player.body.y, 450.0);
        assert_eq!(w.player.tint, Some(DAMAGE_TINT));
        assert!(w.enemies[0].alive);
    }

    #[test]
    fn power_up_absorbs_hit_without_losing_a_life() {
        let mut w = lone_enemy_world(400.0);
        w.session.power_up = true;
        w.player.scale = POWERED_SCALE;
        place_player(&mut w, 400.0, 540.0);
        step(&mut w, idle());
        assert!(!w.session.power_up);
        assert_eq!(w.session.lives, 3);
        assert_eq!(w.player.scale, 1.0);
        // Not repositioned on a shielded hit
        assert!((w.player.body.x - 400.0).abs() < 50.0);
    }

    #[test]
    fn damage_tint_clears_after_flash_delay() {
        let mut w = lone_enemy_world(400.0);
        place_player(&mut w, 400.0, 540.0);
        step(&mut w, idle());
        assert!(w.player.tint.is_some());
        for _ in 0..ticks_for(&w, w.tuning.tint_flash_ms) {
            step(&mut w, idle());
        }
        assert!(w.player.tint.is_none());
    }

    #[test]
    fn last_life_latches_game_over_then_restarts() {
        let mut w = lone_enemy_world(400.0);
        w.session.lives = 1;
        place_player(&mut w, 400.0, 540.0);
        let events = step(&mut w, idle());
        assert!(events.iter().any(|e| matches!(e, GameEvent::GameOverStarted)));
        assert_eq!(w.session.lives, 0);
        assert!(w.session.game_over);
        assert_eq!(w.phase, Phase::GameOver);
        assert_eq!(w.player.body.vx, 0.0);
        assert_eq!(w.player.body.vy, 0.0);

        // Frozen until the scheduled restart: no session mutation
        let score_at_end = w.session.score;
        let mut reset_seen = false;
        for _ in 0..ticks_for(&w, w.tuning.restart_delay_ms) {
            let events = step(&mut w, idle());
            if events.iter().any(|e| matches!(e, GameEvent::SessionReset)) {
                reset_seen = true;
                break;
            }
            assert_eq!(w.session.score, score_at_end);
        }
        assert!(reset_seen);
        assert_eq!(w.session, Session::new());
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.enemies.len(), 25);
        assert_eq!(w.player.body.x, 100.0);
    }

    #[test]
    fn enemy_pair_contact_reverses_both() {
        let mut w = fresh_world();
        w.enemies.clear();
        w.coins.clear();
        w.enemies.push(Enemy::new(400.0, 540.0, 50.0));
        w.enemies.push(Enemy::new(415.0, 540.0, -50.0));
        step(&mut w, idle());
        assert_eq!(w.enemies[0].body.vx, -50.0);
        assert_eq!(w.enemies[1].body.vx, 50.0);
        // Separated so the pair doesn't immediately re-trigger
        assert!(!w.enemies[0].body.overlaps(&w.enemies[1].body));
    }

    #[test]
    fn enemy_reverses_at_world_edge() {
        let mut w = fresh_world();
        w.enemies.clear();
        w.coins.clear();
        w.enemies.push(Enemy::new(12.0, 540.0, -w.tuning.enemy_speed));
        let mut reversed = false;
        for _ in 0..60 {
            step(&mut w, idle());
            if w.enemies[0].body.vx > 0.0 {
                reversed = true;
                break;
            }
        }
        assert!(reversed);
    }

    // ── Goal ──

    #[test]
    fn crossing_goal_line_clears_stage_and_restarts() {
        let mut w = fresh_world();
        place_player(&mut w, 5795.0, 100.0);
        let mut cleared = false;
        for _ in 0..5 {
            let events = step(&mut w, Intent { right: true, ..Intent::default() });
            if events.iter().any(|e| matches!(e, GameEvent::StageCleared)) {
                cleared = true;
                break;
            }
        }
        assert!(cleared);
        assert!(w.session.game_over);
        assert_eq!(w.phase, Phase::StageClear);
        assert_eq!(w.player.body.vx, 0.0);
        assert_eq!(w.player.body.vy, 0.0);
        assert!(w.message.starts_with("STAGE CLEAR!"));

        let mut reset_seen = false;
        for _ in 0..ticks_for(&w, w.tuning.restart_delay_ms) {
            let events = step(&mut w, idle());
            if events.iter().any(|e| matches!(e, GameEvent::SessionReset)) {
                reset_seen = true;
                break;
            }
        }
        assert!(reset_seen);
        assert_eq!(w.session, Session::new());
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn game_over_suppresses_goal() {
        let mut w = fresh_world();
        w.session.game_over = true;
        w.phase = Phase::GameOver;
        place_player(&mut w, 5900.0, 100.0);
        let events = step(&mut w, idle());
        assert!(!events.iter().any(|e| matches!(e, GameEvent::StageCleared)));
    }

    // ── Jump control ──

    #[test]
    fn jump_only_from_the_ground() {
        let mut w = fresh_world();
        w.enemies.clear();
        w.coins.clear();
        // Land first
        for _ in 0..60 {
            step(&mut w, idle());
        }
        assert!(w.player.contacts.on_ground);

        let jump = Intent { jump: true, ..Intent::default() };
        let events = step(&mut w, jump);
        assert!(events.iter().any(|e| matches!(e, GameEvent::Jumped)));
        assert!(w.player.body.vy < 0.0);

        // Still rising: a second jump intent does nothing
        let events = step(&mut w, jump);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::Jumped)));
    }

    #[test]
    fn left_takes_priority_over_right() {
        let mut w = fresh_world();
        w.enemies.clear();
        w.coins.clear();
        let both = Intent { left: true, right: true, ..Intent::default() };
        step(&mut w, both);
        assert_eq!(w.player.body.vx, -w.tuning.run_speed);
    }

    // ── Restart invalidates stale tasks ──

    #[test]
    fn manual_restart_drops_pending_tint_clear() {
        let mut w = lone_enemy_world(400.0);
        place_player(&mut w, 400.0, 540.0);
        step(&mut w, idle());
        assert!(!w.pending.is_empty());
        let old_gen = w.session_gen;

        restart_session(&mut w);
        assert_eq!(w.session_gen, old_gen + 1);
        assert!(w.pending.is_empty());
        assert!(w.player.tint.is_none());
        assert_eq!(w.session, Session::new());

        // Nothing stale fires against the new session
        for _ in 0..ticks_for(&w, w.tuning.tint_flash_ms) {
            step(&mut w, idle());
        }
        assert!(w.player.tint.is_none());
    }
}
