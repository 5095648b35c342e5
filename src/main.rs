/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::entity::Intent;
use sim::event::GameEvent;
use sim::level;
use sim::step;
use sim::world::WorldState;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;
use ui::sprites::SpriteBank;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();

    let mut world = WorldState::new(config.tuning.clone());
    level::build(&mut world);

    let sprites = SpriteBank::new();

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &mut renderer, &sprites, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Pipeworks!");
    println!("Final Score: {}", world.session.score);
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sprites: &SpriteBank,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.tuning.tick_rate_ms);

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(world, &kb, &gp) {
            break;
        }

        if last_tick.elapsed() >= tick_rate {
            // Pause freezes the simulation but keeps the blink timer alive
            if world.paused {
                world.anim_tick = world.anim_tick.wrapping_add(1);
            } else {
                let intent = resolve_intent(&kb, &gp);
                let events = step::step(world, intent);
                process_sound_events(sound, &events);
            }
            last_tick = Instant::now();
        }

        world.pad_connected = gp.connected();
        renderer.render(world, sprites)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_JUMP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W'), KeyCode::Char(' ')];
const KEYS_PAUSE: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc];

/// Merge keyboard and latched-gamepad state into this frame's intent.
fn resolve_intent(kb: &InputState, gp: &GamepadState) -> Intent {
    Intent {
        left: kb.any_held(KEYS_LEFT) || gp.left_held(),
        right: kb.any_held(KEYS_RIGHT) || gp.right_held(),
        jump: kb.any_held(KEYS_JUMP) || gp.jump_held(),
    }
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::Jumped => sfx.play_jump(),
            GameEvent::CoinCollected { .. } => sfx.play_coin(),
            GameEvent::BlockBumped { .. } => sfx.play_block(),
            GameEvent::PowerUpCollected => sfx.play_power_up(),
            GameEvent::EnemyStomped { .. } => sfx.play_stomp(),
            GameEvent::PlayerDamaged => sfx.play_damage(),
            GameEvent::GameOverStarted => sfx.play_game_over(),
            // The victory fanfare reuses the power-up run
            GameEvent::StageCleared => sfx.play_power_up(),
            _ => {}
        }
    }
}

/// Meta input: pause, restart, quit. Returns true to exit the loop.
fn handle_meta(world: &mut WorldState, kb: &InputState, gp: &GamepadState) -> bool {
    if kb.any_pressed(KEYS_QUIT) || gp.cancel_pressed() {
        return true;
    }

    if kb.any_pressed(KEYS_PAUSE) {
        world.paused = !world.paused;
        if world.paused {
            world.set_message("PAUSED  [p] resume", 0);
        } else {
            world.message.clear();
            world.message_timer = 0;
        }
        return false;
    }

    if kb.any_pressed(KEYS_RESTART) || gp.confirm_pressed() {
        world.paused = false;
        step::restart_session(world);
        world.set_message("Session restarted", 40);
    }

    false
}
