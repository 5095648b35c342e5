/// Encounter rules — truth-table driven.
///
/// Pure predicates over actor state — no side effects. These encode
/// "what an encounter means" without performing it; the simulation
/// step applies the outcome.
///
/// ## Player × Enemy
/// ┌────────────────────────────────────┬──────────────┐
/// │ Condition                           │ Outcome      │
/// ├────────────────────────────────────┼──────────────┤
/// │ player vy > 0 AND player above      │ Stomp        │
/// │ otherwise, powered                  │ PowerLost    │
/// │ otherwise, lives > 1                │ LifeLost     │
/// │ otherwise (lives == 1)              │ GameOver     │
/// └────────────────────────────────────┴──────────────┘
/// A stomp never costs a life; losing the power-up never costs a life.
///
/// ## Player × Question Block
/// ┌────────────────────────────────────┬──────────────┐
/// │ Condition                           │ Item fires?  │
/// ├────────────────────────────────────┼──────────────┤
/// │ upward head contact AND armed       │ YES (once)   │
/// │ upward head contact, already spent  │ NO           │
/// │ any other contact direction         │ NO           │
/// └────────────────────────────────────┴──────────────┘

/// Result of a damaging (non-stomp) player × enemy contact.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DamageOutcome {
    /// Power-up absorbs the hit; no life lost.
    PowerLost,
    /// A life is lost; player returns to spawn.
    LifeLost,
    /// Last life lost; the session ends.
    GameOver,
}

/// Is this contact a stomp? The player must be moving downward and its
/// center must sit above the enemy's center.
pub fn is_stomp(player_vy: f32, player_y: f32, enemy_y: f32) -> bool {
    player_vy > 0.0 && player_y < enemy_y
}

/// Classify a non-stomp hit.
pub fn damage_outcome(powered: bool, lives: u32) -> DamageOutcome {
    if powered {
        DamageOutcome::PowerLost
    } else if lives > 1 {
        DamageOutcome::LifeLost
    } else {
        DamageOutcome::GameOver
    }
}

/// Does an upward bump against a question block yield its item?
pub fn block_yields_item(armed: bool, moving_up: bool) -> bool {
    armed && moving_up
}
