use crate::action::MediaAction;
use crate::state::MediaElement;

/// Reducer for the media list of a session. The list behaves like an ordered set keyed
/// by media id.
pub fn reduce(mut media: Vec<MediaElement>, action: &MediaAction) -> Vec<MediaElement> {
    match action {
        MediaAction::AddMedia { media: element, .. } => {
            if !media.iter().any(|m| m.id == element.id) {
                media.push(*element);
            }
        }
        MediaAction::RemoveMedia { media_id, .. } => media.retain(|m| m.id != *media_id),
        MediaAction::UpdateMediaState { media_id, state, .. } => {
            if let Some(element) = media.iter_mut().find(|m| m.id == *media_id) {
                element.state = *state;
            }
        }
    }

    media
}
