//! Per-class `{loading, error, success}` tracking for mutating operations.

use serde::Serialize;

use bazaar_core::ActionClass;

/// State of one action class.
///
/// Transitions `idle -> loading -> (success | error)`. At most one of the
/// three flags is set at a time, and nothing returns it to idle except an
/// explicit [`reset`](ActionState::reset).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionState {
    pub loading: bool,
    pub error: Option<String>,
    pub success: bool,
}

impl ActionState {
    pub fn is_idle(&self) -> bool {
        !self.loading && !self.success && self.error.is_none()
    }

    pub(crate) fn start(&mut self) {
        *self = Self {
            loading: true,
            error: None,
            success: false,
        };
    }

    pub(crate) fn succeed(&mut self) {
        *self = Self {
            loading: false,
            error: None,
            success: true,
        };
    }

    pub(crate) fn fail(&mut self, message: String) {
        *self = Self {
            loading: false,
            error: Some(message),
            success: false,
        };
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// One [`ActionState`] per [`ActionClass`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionStates {
    pub create: ActionState,
    pub update: ActionState,
    pub delete: ActionState,
    pub moderate: ActionState,
}

impl ActionStates {
    pub fn get(&self, class: ActionClass) -> &ActionState {
        match class {
            ActionClass::Create => &self.create,
            ActionClass::Update => &self.update,
            ActionClass::Delete => &self.delete,
            ActionClass::Moderate => &self.moderate,
        }
    }

    pub fn get_mut(&mut self, class: ActionClass) -> &mut ActionState {
        match class {
            ActionClass::Create => &mut self.create,
            ActionClass::Update => &mut self.update,
            ActionClass::Delete => &mut self.delete,
            ActionClass::Moderate => &mut self.moderate,
        }
    }

    /// Clear the error of every class, leaving loading/success untouched.
    pub fn clear_errors(&mut self) {
        for class in ActionClass::ALL_CLASSES {
            self.get_mut(class).error = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_flags_are_exclusive() {
        let mut state = ActionState::default();
        assert!(state.is_idle());

        state.start();
        assert!(state.loading && !state.success && state.error.is_none());

        state.fail("boom".into());
        assert!(!state.loading && !state.success);
        assert_eq!(state.error.as_deref(), Some("boom"));

        state.start();
        assert!(state.error.is_none(), "starting again clears the old error");

        state.succeed();
        assert!(state.success && !state.loading && state.error.is_none());

        state.reset();
        assert!(state.is_idle());
    }

    #[test]
    fn classes_are_independent() {
        let mut states = ActionStates::default();
        states.get_mut(ActionClass::Delete).start();
        states.get_mut(ActionClass::Moderate).fail("nope".into());

        assert!(states.get(ActionClass::Delete).loading);
        assert!(states.get(ActionClass::Create).is_idle());
        assert!(states.get(ActionClass::Update).is_idle());

        states.clear_errors();
        assert!(states.get(ActionClass::Moderate).is_idle());
        assert!(states.get(ActionClass::Delete).loading);
    }
}
