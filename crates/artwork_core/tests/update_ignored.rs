use artwork_core::{update, ControllerState, InjectFailure, Msg};

#[test]
fn engine_events_without_session_change_nothing() {
    let state = ControllerState::default();
    for msg in [
        Msg::ArtifactReady {
            session: 0,
            file_name: "cover.jpg".to_string(),
            byte_len: 10,
        },
        Msg::Injected { session: 0 },
        Msg::InjectionFailed {
            session: 0,
            failure: InjectFailure::InputNotFound,
        },
        Msg::PickerClosed,
        Msg::HostClosing,
        Msg::DownloadFailed {
            session: 0,
            reason: "late".to_string(),
        },
    ] {
        let (next, effects) = update(state.clone(), msg);
        assert_eq!(state, next);
        assert!(effects.is_empty());
    }
}
