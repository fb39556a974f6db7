//! Guard state machines and what each state renders.
//!
//! DESIGN
//! ======
//! Transitions are pure functions so both guards and their tests share one
//! definition of "what happens next". The guards own the side effects.

/// Tenant guard lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GuardState {
    #[default]
    Validating,
    Authenticated,
    Unauthenticated,
}

/// Superadmin guard outcome. There is no validating phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminGuardState {
    Present,
    Absent,
}

/// What a guarded area shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardView {
    Loading,
    Children,
    Blank,
}

/// Next tenant guard state.
///
/// `fetch` is `None` while the profile request is in flight.
#[must_use]
pub fn tenant_transition(credentials_present: bool, fetch: Option<Result<(), ()>>) -> GuardState {
    if !credentials_present {
        return GuardState::Unauthenticated;
    }
    match fetch {
        None => GuardState::Validating,
        Some(Ok(())) => GuardState::Authenticated,
        Some(Err(())) => GuardState::Unauthenticated,
    }
}

#[must_use]
pub fn admin_transition(token_present: bool) -> AdminGuardState {
    if token_present { AdminGuardState::Present } else { AdminGuardState::Absent }
}

impl GuardState {
    #[must_use]
    pub fn view(self) -> GuardView {
        match self {
            Self::Validating => GuardView::Loading,
            Self::Authenticated => GuardView::Children,
            Self::Unauthenticated => GuardView::Blank,
        }
    }
}

impl AdminGuardState {
    /// An absent token keeps the loading view up while the redirect lands.
    #[must_use]
    pub fn view(self) -> GuardView {
        match self {
            Self::Present => GuardView::Children,
            Self::Absent => GuardView::Loading,
        }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;
