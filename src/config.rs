/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or
/// incomplete. Defaults reproduce the stage's intended feel.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Structs ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub tuning: TuningConfig,
    pub gamepad: GamepadConfig,
}

/// Simulation tuning. Velocities in world units/second, delays in ms.
#[derive(Clone, Debug)]
pub struct TuningConfig {
    pub tick_rate_ms: u64,
    pub gravity: f32,
    pub run_speed: f32,
    pub jump_speed: f32,
    pub stomp_bounce: f32,
    pub enemy_speed: f32,
    pub item_speed: f32,
    pub coin_restitution: f32,
    pub tint_flash_ms: u64,
    pub restart_delay_ms: u64,
}

impl TuningConfig {
    /// Fixed timestep in seconds.
    pub fn dt(&self) -> f32 {
        self.tick_rate_ms as f32 / 1000.0
    }
}

impl Default for TuningConfig {
    fn default() -> Self {
        TuningConfig {
            tick_rate_ms: default_tick_rate(),
            gravity: default_gravity(),
            run_speed: default_run_speed(),
            jump_speed: default_jump_speed(),
            stomp_bounce: default_stomp_bounce(),
            enemy_speed: default_enemy_speed(),
            item_speed: default_item_speed(),
            coin_restitution: default_coin_restitution(),
            tint_flash_ms: default_tint_flash(),
            restart_delay_ms: default_restart_delay(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    tuning: TomlTuning,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlTuning {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_run_speed")]
    run_speed: f32,
    #[serde(default = "default_jump_speed")]
    jump_speed: f32,
    #[serde(default = "default_stomp_bounce")]
    stomp_bounce: f32,
    #[serde(default = "default_enemy_speed")]
    enemy_speed: f32,
    #[serde(default = "default_item_speed")]
    item_speed: f32,
    #[serde(default = "default_coin_restitution")]
    coin_restitution: f32,
    #[serde(default = "default_tint_flash")]
    tint_flash_ms: u64,
    #[serde(default = "default_restart_delay")]
    restart_delay_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_jump_buttons")]
    jump: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }
fn default_gravity() -> f32 { 1000.0 }
fn default_run_speed() -> f32 { 200.0 }
fn default_jump_speed() -> f32 { 500.0 }
fn default_stomp_bounce() -> f32 { 300.0 }
fn default_enemy_speed() -> f32 { 50.0 }
fn default_item_speed() -> f32 { 100.0 }
fn default_coin_restitution() -> f32 { 0.3 }
fn default_tint_flash() -> u64 { 1000 }
fn default_restart_delay() -> u64 { 3000 }

fn default_jump_buttons() -> Vec<String> { vec!["A".into(), "B".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlTuning {
    fn default() -> Self {
        TomlTuning {
            tick_rate_ms: default_tick_rate(),
            gravity: default_gravity(),
            run_speed: default_run_speed(),
            jump_speed: default_jump_speed(),
            stomp_bounce: default_stomp_bounce(),
            enemy_speed: default_enemy_speed(),
            item_speed: default_item_speed(),
            coin_restitution: default_coin_restitution(),
            tint_flash_ms: default_tint_flash(),
            restart_delay_ms: default_restart_delay(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_jump_buttons(),
            confirm: default_confirm(),
            cancel: default_cancel(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let toml_cfg = load_toml(&candidate_dirs());

        GameConfig {
            tuning: TuningConfig {
                tick_rate_ms: toml_cfg.tuning.tick_rate_ms.max(1),
                gravity: toml_cfg.tuning.gravity,
                run_speed: toml_cfg.tuning.run_speed,
                jump_speed: toml_cfg.tuning.jump_speed,
                stomp_bounce: toml_cfg.tuning.stomp_bounce,
                enemy_speed: toml_cfg.tuning.enemy_speed,
                item_speed: toml_cfg.tuning.item_speed,
                coin_restitution: toml_cfg.tuning.coin_restitution,
                tint_flash_ms: toml_cfg.tuning.tint_flash_ms,
                restart_delay_ms: toml_cfg.tuning.restart_delay_ms,
            },
            gamepad: GamepadConfig {
                jump: toml_cfg.gamepad.jump,
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() { continue; }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    eprintln!("Warning: config.toml parse error: {e}");
                    eprintln!("Using default settings.");
                    return TomlConfig::default();
                }
            },
            Err(e) => {
                eprintln!("Warning: could not read {}: {e}", path.display());
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stage_feel() {
        let t = TuningConfig::default();
        assert_eq!(t.tick_rate_ms, 16);
        assert_eq!(t.gravity, 1000.0);
        assert_eq!(t.run_speed, 200.0);
        assert_eq!(t.jump_speed, 500.0);
        assert_eq!(t.stomp_bounce, 300.0);
        assert_eq!(t.restart_delay_ms, 3000);
    }

    #[test]
    fn partial_toml_fills_missing_keys() {
        let cfg: TomlConfig = toml::from_str(
            "[tuning]\nrun_speed = 250.0\n",
        ).unwrap();
        assert_eq!(cfg.tuning.run_speed, 250.0);
        assert_eq!(cfg.tuning.gravity, 1000.0);
        assert_eq!(cfg.gamepad.jump, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let cfg: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.tuning.tick_rate_ms, 16);
        assert_eq!(cfg.gamepad.confirm, vec!["Start".to_string()]);
    }

    #[test]
    fn dt_derives_from_tick_rate() {
        let t = TuningConfig::default();
        assert!((t.dt() - 0.016).abs() < 1e-6);
    }
}
