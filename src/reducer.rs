//! Reducers: pure functions computing the next [`BrowserState`] from the current one and
//! an [`Action`].
//!
//! [`reduce`] is the root reducer. It routes session scoped actions to the session they
//! name and runs the slice reducers ([`content`], [`tracking_protection`], [`media`])
//! on that session. Actions for an unknown session leave the state untouched: the
//! session may have been closed between the engine producing an event and the action
//! being applied.

pub mod content;
pub mod media;
pub mod session_list;
pub mod tracking_protection;

use crate::action::Action;
use crate::state::{BrowserState, SessionId, SessionState};
use std::mem;
use std::sync::Arc;

/// Root reducer.
pub fn reduce(state: BrowserState, action: &Action) -> BrowserState {
    match action {
        Action::SessionList(list_action) => session_list::reduce(state, list_action),
        Action::Content(content_action) => update_session(state, content_action.session_id(), |session| {
            session.content = content::reduce(mem::take(&mut session.content), content_action);
            // Loading start also flushes the tracker lists
            session.tracking_protection =
                tracking_protection::reduce(mem::take(&mut session.tracking_protection), action);
        }),
        Action::TrackingProtection(tp_action) => update_session(state, tp_action.session_id(), |session| {
            session.tracking_protection =
                tracking_protection::reduce(mem::take(&mut session.tracking_protection), action);
        }),
        Action::Media(media_action) => update_session(state, media_action.session_id(), |session| {
            session.media = media::reduce(mem::take(&mut session.media), media_action);
        }),
    }
}

/// Applies `f` to the session with the given id. No-op when the session is unknown.
///
/// The session is copied first if an earlier snapshot still shares it; every other
/// session stays shared.
fn update_session(
    mut state: BrowserState,
    session_id: SessionId,
    f: impl FnOnce(&mut SessionState),
) -> BrowserState {
    match state.sessions.iter_mut().find(|s| s.id == session_id) {
        Some(session) => f(Arc::make_mut(session)),
        None => log::trace!("ignoring action for unknown session {session_id}"),
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ContentAction, MediaAction, SessionListAction, TrackingProtectionAction};
    use crate::state::{FindResult, Icon, MediaElement, MediaId, Tracker, TrackingCategory};

    fn state_with(url: &str) -> (BrowserState, SessionId) {
        let session = SessionState::new(url);
        let id = session.id;
        (BrowserState::new(vec![session], Some(id)), id)
    }

    fn content(state: &BrowserState, id: SessionId) -> &crate::state::ContentState {
        &state.find_session(id).unwrap().content
    }

    fn icon() -> Icon {
        Icon {
            source: Some("https://a.example/favicon.ico".into()),
            data: vec![1, 2, 3],
        }
    }

    fn sample_actions(id: SessionId) -> Vec<Action> {
        vec![
            ContentAction::UpdateTitle { session_id: id, title: "A".into() }.into(),
            ContentAction::UpdateLoadingState { session_id: id, loading: true }.into(),
            TrackingProtectionAction::TrackerBlocked {
                session_id: id,
                tracker: Tracker::new("https://t.example", vec![TrackingCategory::Ad]),
            }
            .into(),
            ContentAction::UpdateProgress { session_id: id, progress: 250 }.into(),
            ContentAction::UpdateUrl { session_id: id, url: "https://a.example/next".into() }.into(),
            MediaAction::AddMedia { session_id: id, media: MediaElement::new(MediaId::new()) }.into(),
            ContentAction::UpdateLoadingState { session_id: id, loading: false }.into(),
        ]
    }

    #[test]
    fn replay_is_deterministic() {
        let (initial, id) = state_with("https://a.example/x");
        let actions = sample_actions(id);

        let first = actions.iter().fold(initial.clone(), reduce);
        let second = actions.iter().fold(initial, reduce);
        assert_eq!(first, second);
        assert_eq!(content(&first, id).progress, 100);
        assert_eq!(first.find_session(id).unwrap().tracking_protection.blocked_trackers.len(), 1);
    }

    #[test]
    fn unknown_session_leaves_state_unchanged() {
        let (initial, _) = state_with("https://a.example/x");
        let stranger = SessionId::new();

        for action in sample_actions(stranger) {
            let next = reduce(initial.clone(), &action);
            assert_eq!(next, initial);
        }
    }

    #[test]
    fn same_origin_navigation_clears_title_keeps_icon() {
        let (state, id) = state_with("https://a.example/x");
        let state = reduce(state, &ContentAction::UpdateTitle { session_id: id, title: "X".into() }.into());
        let state = reduce(state, &ContentAction::UpdateIcon { session_id: id, icon: icon() }.into());

        let state = reduce(state, &ContentAction::UpdateUrl { session_id: id, url: "https://a.example/y".into() }.into());

        assert_eq!(content(&state, id).url, "https://a.example/y");
        assert!(content(&state, id).title.is_empty());
        assert_eq!(content(&state, id).icon, Some(icon()));
    }

    #[test]
    fn cross_host_navigation_clears_title_and_icon() {
        let (state, id) = state_with("https://a.example/x");
        let state = reduce(state, &ContentAction::UpdateTitle { session_id: id, title: "X".into() }.into());
        let state = reduce(state, &ContentAction::UpdateIcon { session_id: id, icon: icon() }.into());

        let state = reduce(state, &ContentAction::UpdateUrl { session_id: id, url: "https://b.example/x".into() }.into());

        assert!(content(&state, id).title.is_empty());
        assert!(content(&state, id).icon.is_none());
    }

    #[test]
    fn loading_start_flushes_transients_across_slices() {
        let (state, id) = state_with("https://a.example/x");
        let tracker = Tracker::new("https://t.example/pixel", vec![TrackingCategory::Analytic]);
        let actions: [Action; 3] = [
            ContentAction::AddFindResult {
                session_id: id,
                result: FindResult { active_match_ordinal: 1, number_of_matches: 3, is_done_counting: true },
            }
            .into(),
            TrackingProtectionAction::TrackerBlocked { session_id: id, tracker: tracker.clone() }.into(),
            TrackingProtectionAction::TrackerLoaded { session_id: id, tracker }.into(),
        ];
        let state = actions.iter().fold(state, reduce);

        let state = reduce(state, &ContentAction::UpdateLoadingState { session_id: id, loading: true }.into());

        let session = state.find_session(id).unwrap();
        assert!(session.content.loading);
        assert!(session.content.find_results.is_empty());
        assert!(session.tracking_protection.blocked_trackers.is_empty());
        assert!(session.tracking_protection.loaded_trackers.is_empty());
    }

    #[test]
    fn session_order_is_preserved_when_updating() {
        let a = SessionState::new("https://a.example");
        let b = SessionState::new("https://b.example");
        let c = SessionState::new("https://c.example");
        let ids = [a.id, b.id, c.id];
        let state = BrowserState::new(vec![a, b, c], None);

        let state = reduce(state, &ContentAction::UpdateTitle { session_id: ids[1], title: "B".into() }.into());

        let order: Vec<_> = state.sessions.iter().map(|s| s.id).collect();
        assert_eq!(order, ids);
        assert_eq!(state.sessions[1].content.title, "B");
    }

    #[test]
    fn session_list_actions_route_to_list_reducer() {
        let state = BrowserState::default();
        let session = SessionState::new("https://gosub.io");
        let id = session.id;

        let state = reduce(state, &SessionListAction::AddSession { session, select: false }.into());
        assert_eq!(state.selected_session_id, Some(id));
    }
}
