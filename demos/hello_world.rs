use gosub_state::observer::{LocalMediaHandle, MediaHandle};
use gosub_state::state::{
    LoadDecision, LoadRequestFlags, MediaPlaybackState, Permission, PermissionDecision, PermissionRequest, Tracker,
    TrackingCategory,
};
use gosub_state::store::RequestResponse;
use gosub_state::{
    BrowserState, EngineEvent, SessionObserver, SessionState, Store, StoreConfig, StoreError,
};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), StoreError> {
    env_logger::init();

    // Configure the store. Turning on action logging makes every action show up at debug
    // level (RUST_LOG=debug).
    let store_cfg = StoreConfig::builder()
        .log_actions(true)
        .build()?;

    // Start with one session. The first session added is selected automatically.
    let session = SessionState::new("about:blank");
    let session_id = session.id;
    let store = Store::with_config(BrowserState::new(vec![session], Some(session_id)), store_cfg)?;

    // Print every committed state
    let subscription = store.subscribe(|snapshot| {
        if let Some(session) = snapshot.state.selected_session() {
            println!(
                "v{}: {} \"{}\" loading={} progress={} trackers={}",
                snapshot.version,
                session.content.url,
                session.content.title,
                session.content.loading,
                session.content.progress,
                session.tracking_protection.blocked_trackers.len(),
            );
        }
    });

    // The adapter runs as its own task and receives engine events over a channel. In a
    // real embedding the engine's callbacks would feed this channel.
    let mut states = store.subscribe_states();
    let (event_tx, event_rx) = mpsc::channel(32);
    let cancel = CancellationToken::new();
    let adapter = SessionObserver::bound(session_id, store.clone()).spawn(event_rx, cancel.clone());

    // Simulate a page load
    let (load_tx, load_rx) = oneshot::channel();
    let _ = event_tx
        .send(EngineEvent::LoadRequest {
            url: "https://gosub.io".into(),
            flags: LoadRequestFlags::empty(),
            responder: load_tx,
        })
        .await;
    let _ = event_tx.send(EngineEvent::LocationChange { url: "https://gosub.io".into() }).await;
    let _ = event_tx.send(EngineEvent::LoadingStateChange { loading: true }).await;
    let _ = event_tx
        .send(EngineEvent::TrackerBlocked(Tracker::new(
            "https://ads.example/pixel.gif",
            vec![TrackingCategory::Ad],
        )))
        .await;
    let _ = event_tx.send(EngineEvent::ProgressChange { progress: 60 }).await;
    let _ = event_tx.send(EngineEvent::TitleChange { title: "Gosub browser".into() }).await;

    // The page asks for the camera
    let (perm_tx, perm_rx) = oneshot::channel();
    let request = PermissionRequest::new("https://gosub.io", vec![Permission::Camera]);
    let _ = event_tx
        .send(EngineEvent::ContentPermissionRequest { request: request.clone(), responder: perm_tx })
        .await;

    // A video starts playing
    let video = Arc::new(LocalMediaHandle::default());
    let _ = event_tx.send(EngineEvent::MediaAdded(video.clone())).await;

    // Wait until the adapter has reported the video, then start playback. The adapter's
    // playback observer turns this into a state update.
    while let Ok(snapshot) = states.recv().await {
        if snapshot.state.find_session(session_id).is_some_and(|s| !s.media.is_empty()) {
            break;
        }
    }
    video.set_state(MediaPlaybackState::Playing);

    let _ = event_tx.send(EngineEvent::ProgressChange { progress: 100 }).await;
    let _ = event_tx.send(EngineEvent::LoadingStateChange { loading: false }).await;

    // Stop the adapter once it has drained the channel
    drop(event_tx);
    let _ = adapter.await;

    // The UI answers the pending requests
    if let Some(load) = store.state().find_session(session_id).and_then(|s| s.content.load_request.clone()) {
        store.resolve(session_id, load.id, RequestResponse::Load(LoadDecision::Allow))?;
    }
    store.resolve(
        session_id,
        request.id,
        RequestResponse::Permission(PermissionDecision::Grant(vec![Permission::Camera])),
    )?;

    println!("engine got load decision: {:?}", load_rx.await);
    println!("engine got permission decision: {:?}", perm_rx.await);
    println!("media {} is {:?}", video.id(), video.state());

    subscription.unsubscribe();
    cancel.cancel();

    match store.snapshot().to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("cannot render state: {e}"),
    }

    Ok(())
}
