//! How a change in a player's intent is mirrored into the engine.
//!
//! Keyed on (what the player just did, whether the engine already has a
//! seat for them). Every cell of the table is listed in [`transition`], so
//! nothing depends on ad hoc "looks seated" checks scattered through the
//! router.
//!
//! | Intent      | Seated                | Not seated              |
//! |-------------|-----------------------|-------------------------|
//! | Ready       | defaulting off        | add, not defaulting     |
//! | SitOut      | defaulting on         | add, defaulting         |
//! | Disconnect  | defaulting on         | nothing                 |

use cardroom_protocol::PlayerId;

use crate::{EngineError, TableEngine};

/// What the player's latest message or event means for the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Ready,
    SitOut,
    Disconnect,
}

/// Whether the engine already has a seat for the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Seated,
    NotSeated,
}

impl Membership {
    pub fn of<E: TableEngine>(engine: &E, player: &PlayerId) -> Self {
        if engine.is_seated(player) {
            Self::Seated
        } else {
            Self::NotSeated
        }
    }
}

/// The engine call a transition requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCall {
    SetDefaulting(bool),
    AddPlayer { defaulting: bool },
    Nothing,
}

/// The full transition table.
pub fn transition(intent: Intent, membership: Membership) -> EngineCall {
    use EngineCall::*;
    match (intent, membership) {
        (Intent::Ready, Membership::Seated) => SetDefaulting(false),
        (Intent::Ready, Membership::NotSeated) => AddPlayer { defaulting: false },
        (Intent::SitOut, Membership::Seated) => SetDefaulting(true),
        (Intent::SitOut, Membership::NotSeated) => AddPlayer { defaulting: true },
        (Intent::Disconnect, Membership::Seated) => SetDefaulting(true),
        (Intent::Disconnect, Membership::NotSeated) => Nothing,
    }
}

/// Looks up and applies the transition for `player` against `engine`.
pub fn apply<E: TableEngine>(
    engine: &mut E,
    player: &PlayerId,
    intent: Intent,
) -> Result<EngineCall, EngineError> {
    let call = transition(intent, Membership::of(engine, player));
    match call {
        EngineCall::SetDefaulting(on) => engine.set_player_defaulting(player, on)?,
        EngineCall::AddPlayer { defaulting } => engine.add_player(player, defaulting)?,
        EngineCall::Nothing => {}
    }
    Ok(call)
}
