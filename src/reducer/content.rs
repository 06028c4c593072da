use crate::action::ContentAction;
use crate::origin::same_scheme_and_host;
use crate::state::{ConsumableKind, ContentState, RequestId};

/// Reducer for the content slice of a session.
pub fn reduce(mut state: ContentState, action: &ContentAction) -> ContentState {
    match action {
        ContentAction::UpdateUrl { url, .. } => {
            if *url != state.url {
                state.title.clear();
            }
            if !same_scheme_and_host(&state.url, url) {
                state.icon = None;
            }
            state.url = url.clone();

            // Page scoped, gone on every navigation
            state.recording_devices.clear();
            state.content_permission_request = None;
            state.web_app_manifest = None;
        }
        ContentAction::UpdateLoadingState { loading, .. } => {
            state.loading = *loading;
            if *loading {
                state.find_results.clear();
            }
        }
        ContentAction::UpdateProgress { progress, .. } => {
            state.progress = (*progress).min(100);
        }
        ContentAction::UpdateNavigationState {
            can_go_back,
            can_go_forward,
            ..
        } => {
            if let Some(back) = can_go_back {
                state.can_go_back = *back;
            }
            if let Some(forward) = can_go_forward {
                state.can_go_forward = *forward;
            }
        }
        ContentAction::UpdateSearchTerms { search_terms, .. } => {
            state.search_terms = search_terms.clone();
        }

        ContentAction::UpdateTitle { title, .. } => state.title = title.clone(),
        ContentAction::UpdateIcon { icon, .. } => state.icon = Some(icon.clone()),
        ContentAction::RemoveIcon { .. } => state.icon = None,
        ContentAction::UpdateThumbnail { thumbnail, .. } => state.thumbnail = Some(thumbnail.clone()),
        ContentAction::RemoveThumbnail { .. } => state.thumbnail = None,
        ContentAction::UpdateSecurityInfo { security_info, .. } => {
            state.security_info = security_info.clone();
        }
        ContentAction::UpdateWebAppManifest { manifest, .. } => {
            state.web_app_manifest = Some(manifest.clone());
        }
        ContentAction::RemoveWebAppManifest { .. } => state.web_app_manifest = None,

        ContentAction::UpdateDesktopMode { enabled, .. } => state.desktop_mode = *enabled,
        ContentAction::UpdateFullScreen { enabled, .. } => state.full_screen = *enabled,
        ContentAction::UpdateCrashState { crashed, .. } => state.crashed = *crashed,
        ContentAction::UpdateRecordingDevices { devices, .. } => {
            state.recording_devices = devices.clone();
        }

        ContentAction::AddFindResult { result, .. } => state.find_results.push(*result),
        ContentAction::ClearFindResults { .. } => state.find_results.clear(),

        ContentAction::UpdateLoadRequest { request, .. } => state.load_request = Some(request.clone()),
        ContentAction::UpdateHitResult { hit_result, .. } => state.hit_result = Some(hit_result.clone()),
        ContentAction::UpdateDownload { download, .. } => state.download = Some(download.clone()),
        ContentAction::UpdatePermissionsRequest { request, .. } => {
            state.content_permission_request = Some(request.clone());
        }
        ContentAction::UpdateAppPermissionsRequest { request, .. } => {
            state.app_permission_request = Some(request.clone());
        }
        ContentAction::UpdatePromptRequest { request, .. } => state.prompt_request = Some(request.clone()),
        ContentAction::UpdateWindowRequest { request, .. } => state.window_request = Some(request.clone()),
        ContentAction::Consume { kind, request_id, .. } => consume(&mut state, *kind, *request_id),
    }

    state
}

fn consume(state: &mut ContentState, kind: ConsumableKind, request_id: Option<RequestId>) {
    match kind {
        ConsumableKind::LoadRequest => clear_slot(&mut state.load_request, request_id, |r| r.id),
        ConsumableKind::HitResult => clear_slot(&mut state.hit_result, request_id, |r| r.id),
        ConsumableKind::Download => clear_slot(&mut state.download, request_id, |r| r.id),
        ConsumableKind::ContentPermissionRequest => {
            clear_slot(&mut state.content_permission_request, request_id, |r| r.id)
        }
        ConsumableKind::AppPermissionRequest => clear_slot(&mut state.app_permission_request, request_id, |r| r.id),
        ConsumableKind::PromptRequest => clear_slot(&mut state.prompt_request, request_id, |r| r.id),
        ConsumableKind::WindowRequest => clear_slot(&mut state.window_request, request_id, |r| r.id),
    }
}

/// Empties `slot`, unless `request_id` names a different request than the stored one.
fn clear_slot<T>(slot: &mut Option<T>, request_id: Option<RequestId>, id_of: impl Fn(&T) -> RequestId) {
    match (slot.as_ref(), request_id) {
        (Some(current), Some(id)) if id_of(current) != id => {}
        _ => *slot = None,
    }
}
