use crate::action::SessionListAction;
use crate::state::BrowserState;
use std::sync::Arc;

/// Reducer for the list of sessions and the selection.
pub fn reduce(mut state: BrowserState, action: &SessionListAction) -> BrowserState {
    match action {
        SessionListAction::AddSession { session, select } => {
            if state.session_index(session.id).is_some() {
                log::warn!("session {} already exists, not adding it again", session.id);
                return state;
            }

            state.sessions.push(Arc::new(session.clone()));
            if *select || state.selected_session_id.is_none() {
                state.selected_session_id = Some(session.id);
            }
        }
        SessionListAction::RemoveSession { session_id } => {
            let Some(index) = state.session_index(*session_id) else {
                return state;
            };

            state.sessions.remove(index);
            if state.selected_session_id == Some(*session_id) {
                // Prefer the session that took its place, otherwise the one before it
                state.selected_session_id = state
                    .sessions
                    .get(index)
                    .or_else(|| index.checked_sub(1).and_then(|i| state.sessions.get(i)))
                    .map(|s| s.id);
            }
        }
        SessionListAction::SelectSession { session_id } => {
            if state.session_index(*session_id).is_some() {
                state.selected_session_id = Some(*session_id);
            }
        }
        SessionListAction::RemoveAllSessions => {
            state.sessions.clear();
            state.selected_session_id = None;
        }
    }

    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{SessionId, SessionState};

    fn three_sessions() -> (BrowserState, [SessionId; 3]) {
        let sessions: Vec<_> = ["https://a.example", "https://b.example", "https://c.example"]
            .into_iter()
            .map(SessionState::new)
            .collect();
        let ids = [sessions[0].id, sessions[1].id, sessions[2].id];
        (BrowserState::new(sessions, Some(ids[0])), ids)
    }

    #[test]
    fn first_added_session_is_selected() {
        let first = SessionState::new("https://a.example");
        let second = SessionState::new("https://b.example");
        let first_id = first.id;

        let state = reduce(BrowserState::default(), &SessionListAction::AddSession { session: first, select: false });
        let state = reduce(state, &SessionListAction::AddSession { session: second.clone(), select: false });
        assert_eq!(state.selected_session_id, Some(first_id));

        let state = reduce(state, &SessionListAction::AddSession { session: SessionState::new("x"), select: true });
        assert_ne!(state.selected_session_id, Some(first_id));
        assert_eq!(state.sessions.len(), 3);
    }

    #[test]
    fn duplicate_add_is_ignored() {
        let session = SessionState::new("https://a.example");
        let action = SessionListAction::AddSession { session, select: true };

        let state = reduce(BrowserState::default(), &action);
        let state = reduce(state, &action);
        assert_eq!(state.sessions.len(), 1);
    }

    #[test]
    fn removing_selected_selects_next_then_previous() {
        let (state, ids) = three_sessions();
        let state = reduce(state, &SessionListAction::SelectSession { session_id: ids[1] });

        let state = reduce(state, &SessionListAction::RemoveSession { session_id: ids[1] });
        assert_eq!(state.selected_session_id, Some(ids[2]));

        let state = reduce(state, &SessionListAction::RemoveSession { session_id: ids[2] });
        assert_eq!(state.selected_session_id, Some(ids[0]));

        let state = reduce(state, &SessionListAction::RemoveSession { session_id: ids[0] });
        assert_eq!(state.selected_session_id, None);
        assert!(state.sessions.is_empty());
    }

    #[test]
    fn removing_unselected_keeps_selection() {
        let (state, ids) = three_sessions();
        let state = reduce(state, &SessionListAction::RemoveSession { session_id: ids[2] });
        assert_eq!(state.selected_session_id, Some(ids[0]));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let (state, _) = three_sessions();
        let stranger = SessionId::new();

        let after_select = reduce(state.clone(), &SessionListAction::SelectSession { session_id: stranger });
        let after_remove = reduce(state.clone(), &SessionListAction::RemoveSession { session_id: stranger });
        assert_eq!(after_select, state);
        assert_eq!(after_remove, state);
    }

    #[test]
    fn remove_all_clears_selection() {
        let (state, _) = three_sessions();
        let state = reduce(state, &SessionListAction::RemoveAllSessions);
        assert_eq!(state, BrowserState::default());
    }
}
