use crate::action::{Action, ContentAction, TrackingProtectionAction};
use crate::state::TrackingProtectionState;

/// Reducer for the tracking protection slice.
///
/// Besides its own actions it reacts to [`ContentAction::UpdateLoadingState`]: a new
/// load invalidates the trackers recorded for the previous page.
pub fn reduce(mut state: TrackingProtectionState, action: &Action) -> TrackingProtectionState {
    match action {
        Action::TrackingProtection(tp_action) => match tp_action {
            TrackingProtectionAction::ToggleTrackingProtection { enabled, .. } => state.enabled = *enabled,
            TrackingProtectionAction::TrackerBlocked { tracker, .. } => state.blocked_trackers.push(tracker.clone()),
            TrackingProtectionAction::TrackerLoaded { tracker, .. } => state.loaded_trackers.push(tracker.clone()),
            TrackingProtectionAction::ToggleExclusionList { excluded, .. } => {
                state.ignored_on_tracking_protection = *excluded;
            }
            TrackingProtectionAction::ClearTrackers { .. } => clear_trackers(&mut state),
        },
        Action::Content(ContentAction::UpdateLoadingState { loading: true, .. }) => clear_trackers(&mut state),
        _ => {}
    }

    state
}

fn clear_trackers(state: &mut TrackingProtectionState) {
    state.blocked_trackers.clear();
    state.loaded_trackers.clear();
}
