use artwork_logging::{artwork_diag, artwork_error, artwork_info, artwork_warn};

use crate::{
    authenticate, build_search_url, ControllerState, Effect, FailureReason, FormFields,
    InjectFailure, Msg, SessionId, SessionState,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ControllerState, msg: Msg) -> (ControllerState, Vec<Effect>) {
    let effects = match msg {
        Msg::OpenPicker {
            request,
            session_token,
        } => {
            let url = match build_search_url(
                &state.config().search_origin,
                &state.config().remote_agent,
                &request,
                Some(&session_token),
            ) {
                Ok(url) => url,
                Err(err) => {
                    artwork_error!("Cannot build search url: {}", err);
                    state.set_status(format!("Error: invalid search origin ({err})"));
                    return (state, Vec::new());
                }
            };

            // A new picker supersedes whatever the previous session was doing.
            let mut effects = Vec::with_capacity(2);
            if state.session().is_working() {
                effects.push(Effect::CancelInFlight);
            }
            state.begin_session(request, session_token);
            state.set_status("Artwork search opened. Pick an artwork.");
            artwork_info!("Session {} opened picker", state.session_id());
            effects.push(Effect::OpenPicker {
                url: url.to_string(),
            });
            effects
        }
        Msg::MessageReceived(envelope) => {
            if *state.session() != SessionState::AwaitingSelection {
                artwork_diag!(
                    "Ignoring message from {} in state {:?}",
                    envelope.origin,
                    state.session()
                );
                return (state, Vec::new());
            }
            let accepted = authenticate(
                &envelope,
                &state.config().search_origin,
                state.session_token(),
            );
            match accepted {
                Ok(selection) => {
                    artwork_info!(
                        "Artwork selected url={} release_date={:?}",
                        selection.url,
                        selection.release_date
                    );
                    let url = selection.url.clone();
                    state.accept_selection(selection);
                    state.set_status("Artwork selected! Downloading and setting...");
                    vec![Effect::Acquire {
                        session: state.session_id(),
                        url,
                    }]
                }
                Err(reason) => {
                    artwork_diag!(
                        "Ignoring message from {}: {:?} payload={}",
                        envelope.origin,
                        reason,
                        envelope.data
                    );
                    Vec::new()
                }
            }
        }
        Msg::ArtifactReady {
            session,
            file_name,
            byte_len,
        } => {
            if is_stale(&state, session) || *state.session() != SessionState::Downloading {
                return (state, Vec::new());
            }
            let fields = match state.request() {
                Some(request) => FormFields::compose(
                    request,
                    state.selection().and_then(|s| s.release_date.as_deref()),
                ),
                None => return (state, Vec::new()),
            };
            artwork_info!("Downloaded {} ({} bytes)", file_name, byte_len);
            state.transition(SessionState::Injecting);
            state.set_status("Artwork downloaded. Setting it on the upload form...");
            vec![Effect::Inject {
                session: state.session_id(),
                fields,
            }]
        }
        Msg::DownloadFailed { session, reason } => {
            if is_stale(&state, session) || *state.session() != SessionState::Downloading {
                return (state, Vec::new());
            }
            fail(&mut state, FailureReason::Download(reason))
        }
        Msg::Injected { session } => {
            if is_stale(&state, session) || *state.session() != SessionState::Injecting {
                return (state, Vec::new());
            }
            state.transition(SessionState::Complete);
            state.set_status("✓ Artwork set! You can now upload it.");
            Vec::new()
        }
        Msg::InjectionFailed { session, failure } => {
            if is_stale(&state, session) || *state.session() != SessionState::Injecting {
                return (state, Vec::new());
            }
            let reason = match failure {
                InjectFailure::InputNotFound => FailureReason::InputNotFound,
                InjectFailure::Other(message) => FailureReason::Injection(message),
            };
            fail(&mut state, reason)
        }
        Msg::PickerClosed => {
            if *state.session() == SessionState::AwaitingSelection {
                artwork_info!("Picker closed before a selection was made");
                state.end_session();
                state.set_status("Picker closed without a selection.");
            }
            Vec::new()
        }
        Msg::HostClosing => {
            let working = state.session().is_working();
            if *state.session() != SessionState::Idle && !state.session().is_terminal() {
                state.end_session();
            }
            if working {
                vec![Effect::CancelInFlight]
            } else {
                Vec::new()
            }
        }
    };

    (state, effects)
}

/// Engine results are tagged with the session that asked for them; a reopened
/// picker must not inherit the outcome of the work it superseded.
fn is_stale(state: &ControllerState, session: SessionId) -> bool {
    if session == state.session_id() {
        return false;
    }
    artwork_diag!(
        "Ignoring engine result for session {} (current {})",
        session,
        state.session_id()
    );
    true
}

fn fail(state: &mut ControllerState, reason: FailureReason) -> Vec<Effect> {
    artwork_warn!("Session {} failed: {}", state.session_id(), reason);
    state.set_status(format!("Error: {reason}"));
    state.transition(SessionState::Failed(reason));
    match state.selection() {
        Some(selection) => vec![Effect::OfferManualFallback {
            url: selection.url.clone(),
        }],
        None => Vec::new(),
    }
}
