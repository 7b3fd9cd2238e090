//! Game phases and the transition table
//!
//! The phase machine is an enum plus a pure `(phase, event) -> (next, action)`
//! table. The tick loop turns input and animation completion into
//! [`PhaseEvent`]s and performs the returned [`PhaseAction`].

use serde::{Deserialize, Serialize};

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen
    Menu,
    /// Menu slides away before the first run
    TransitionFromMenu,
    /// Menu slides back in
    TransitionToMenu,
    /// Active run
    Playing,
    /// Simulation frozen
    Paused,
    /// Singularity expands over the screen
    TransitionToSummary,
    /// End-of-run results
    Summary,
    /// Singularity shrinks into the shop core
    TransitionToShop,
    /// Upgrade tree is interactable
    Progression,
    /// Shop nodes retract
    TransitionFromShop,
    /// Singularity grows back to its base radius
    TransitionToPlay,
}

impl GamePhase {
    /// Phases that run the full entity simulation
    pub fn simulates(self) -> bool {
        matches!(self, GamePhase::Playing)
    }

    pub fn is_transition(self) -> bool {
        matches!(
            self,
            GamePhase::TransitionFromMenu
                | GamePhase::TransitionToMenu
                | GamePhase::TransitionToSummary
                | GamePhase::TransitionToShop
                | GamePhase::TransitionFromShop
                | GamePhase::TransitionToPlay
        )
    }
}

/// Something that may move the phase machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseEvent {
    StartClicked,
    PauseToggled,
    /// Quit from pause: end the run early
    EndRunRequested,
    TimeExpired,
    /// The current transition's animation finished
    AnimationComplete,
    Restart,
    OpenShop,
    BackToMenu,
    LeaveShop,
}

/// Side effect the state performs on a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseAction {
    None,
    /// Start covering the screen
    ExpandSingularity,
    /// Drop bodies and effects
    ClearArena,
    /// Fresh run: timer, xp, quota, singularity back to base
    ResetRun,
    /// Shrink into the shop core, nodes start hidden
    EnterShop,
    /// Fresh run, then slide the menu back in
    ReturnToMenu,
}

/// Look up the transition for `event` in `phase`.
///
/// `None` means the event is ignored in this phase.
pub fn transition(phase: GamePhase, event: PhaseEvent) -> Option<(GamePhase, PhaseAction)> {
    use GamePhase::*;
    use PhaseAction as A;
    use PhaseEvent as E;

    let next = match (phase, event) {
        (Menu, E::StartClicked) => (TransitionFromMenu, A::None),
        (TransitionFromMenu, E::AnimationComplete) => (Playing, A::None),
        (TransitionToMenu, E::AnimationComplete) => (Menu, A::None),

        (Playing, E::PauseToggled) => (Paused, A::None),
        (Playing, E::TimeExpired) => (TransitionToSummary, A::ExpandSingularity),
        (Paused, E::PauseToggled) => (Playing, A::None),
        (Paused, E::EndRunRequested) => (TransitionToSummary, A::ExpandSingularity),

        (TransitionToSummary, E::AnimationComplete) => (Summary, A::ClearArena),
        (Summary, E::Restart) => (TransitionToPlay, A::ResetRun),
        (Summary, E::OpenShop) => (TransitionToShop, A::EnterShop),
        (Summary, E::BackToMenu) => (TransitionToMenu, A::ReturnToMenu),

        (TransitionToShop, E::AnimationComplete) => (Progression, A::None),
        (Progression, E::LeaveShop) => (TransitionFromShop, A::None),
        (TransitionFromShop, E::AnimationComplete) => (TransitionToPlay, A::ResetRun),
        (TransitionToPlay, E::AnimationComplete) => (Playing, A::None),

        _ => return None,
    };
    Some(next)
}
