use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use artwork_core::{authenticate, DEFAULT_HOST_ORIGIN, DEFAULT_SEARCH_ORIGIN};
use artwork_engine::{
    channel, Agent, AgentSettings, AgentState, ChannelPickerWindow, ClickDisposition, PickerPage,
    PickerSession, PickerWindow,
};
use scraper::{Html, Selector};
use url::Url;

const PAGE: &str = r#"<html><body>
    <section class="results">
        <div class="cover"><img src="https://cdn.example/cover-300.jpg" data-full="https://cdn/img-full.jpg"></div>
        <a class="more" href="/next">More results</a>
    </section>
    <table><tr><td>Released</td><td>2020-05-01</td></tr></table>
</body></html>"#;

fn picker_url() -> Url {
    Url::parse(&format!(
        "{DEFAULT_SEARCH_ORIGIN}/?artist=A&album=B&identifier=artwork-picker-session&session=tok-1"
    ))
    .unwrap()
}

fn settings() -> AgentSettings {
    AgentSettings {
        image_wait_timeout: Duration::from_millis(200),
        image_poll_interval: Duration::from_millis(10),
        close_delay: Duration::from_millis(10),
    }
}

fn agent_with(window: Arc<ChannelPickerWindow>) -> Agent {
    let session = PickerSession::detect(&picker_url(), DEFAULT_SEARCH_ORIGIN).unwrap();
    Agent::new(
        session,
        DEFAULT_HOST_ORIGIN,
        window as Arc<dyn PickerWindow>,
        settings(),
    )
}

fn click(agent: &mut Agent, target: &str) -> ClickDisposition {
    let document = Html::parse_document(PAGE);
    let selector = Selector::parse(target).unwrap();
    let element = document.select(&selector).next().unwrap();
    agent.on_click(&document, element)
}

#[test]
fn detection_requires_search_origin_and_marker() {
    let session = PickerSession::detect(&picker_url(), DEFAULT_SEARCH_ORIGIN).unwrap();
    assert_eq!(session.session_token.as_deref(), Some("tok-1"));

    let foreign = Url::parse("https://elsewhere.example/?identifier=artwork-picker-session").unwrap();
    assert_eq!(PickerSession::detect(&foreign, DEFAULT_SEARCH_ORIGIN), None);

    let unmarked = Url::parse(&format!("{DEFAULT_SEARCH_ORIGIN}/?artist=A")).unwrap();
    assert_eq!(PickerSession::detect(&unmarked, DEFAULT_SEARCH_ORIGIN), None);
}

#[tokio::test]
async fn first_click_sends_exactly_one_message() {
    let (window, mut listener) = channel(DEFAULT_SEARCH_ORIGIN, DEFAULT_HOST_ORIGIN);
    let window = Arc::new(window);
    let mut agent = agent_with(Arc::clone(&window));

    assert_eq!(click(&mut agent, "div.cover"), ClickDisposition::Intercepted { sent: true });
    assert_eq!(agent.state(), AgentState::Consumed);
    assert_eq!(click(&mut agent, "img"), ClickDisposition::Intercepted { sent: false });

    let envelope = listener
        .recv_timeout(Duration::from_secs(1))
        .await
        .unwrap()
        .expect("selection message");
    assert_eq!(envelope.origin, DEFAULT_SEARCH_ORIGIN);
    let message = authenticate(&envelope, DEFAULT_SEARCH_ORIGIN, Some("tok-1")).unwrap();
    assert_eq!(message.url, "https://cdn/img-full.jpg");
    assert_eq!(message.release_date.as_deref(), Some("2020-05-01"));
    assert_eq!(window.marked().as_deref(), Some("https://cdn/img-full.jpg"));
    assert!(window.opener_focused());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(window.is_closed());
    // The close drops the sender, so only the one message was ever queued.
    assert_eq!(listener.recv().await, None);
}

#[tokio::test]
async fn click_without_image_passes_through() {
    let (window, _listener) = channel(DEFAULT_SEARCH_ORIGIN, DEFAULT_HOST_ORIGIN);
    let mut agent = agent_with(Arc::new(window));
    assert_eq!(click(&mut agent, "a.more"), ClickDisposition::PassThrough);
    assert_eq!(agent.state(), AgentState::Armed);
}

#[tokio::test]
async fn nothing_is_sent_once_the_opener_is_gone() {
    let (window, mut listener) = channel(DEFAULT_SEARCH_ORIGIN, DEFAULT_HOST_ORIGIN);
    let window = Arc::new(window);
    let mut agent = agent_with(Arc::clone(&window));
    listener.close();

    assert_eq!(click(&mut agent, "img"), ClickDisposition::Intercepted { sent: false });
    assert_eq!(agent.state(), AgentState::Armed);
    assert!(!window.is_closed());
}

#[test]
fn posting_to_another_origin_is_refused() {
    let (window, _listener) = channel(DEFAULT_SEARCH_ORIGIN, DEFAULT_HOST_ORIGIN);
    let result = window.post_value(serde_json::json!({"kind": "artworkSelected"}), "https://evil.example");
    assert!(result.is_err());
}

struct SlowPage {
    polls: AtomicUsize,
    ready_after: usize,
}

impl PickerPage for SlowPage {
    fn url(&self) -> Url {
        picker_url()
    }

    fn snapshot(&self) -> String {
        let seen = self.polls.fetch_add(1, Ordering::SeqCst);
        if seen >= self.ready_after {
            PAGE.to_string()
        } else {
            "<html><body><p>Loading…</p></body></html>".to_string()
        }
    }
}

#[tokio::test]
async fn waits_for_images_to_render() {
    let (window, _listener) = channel(DEFAULT_SEARCH_ORIGIN, DEFAULT_HOST_ORIGIN);
    let agent = agent_with(Arc::new(window));
    let page = SlowPage {
        polls: AtomicUsize::new(0),
        ready_after: 3,
    };
    assert!(agent.wait_until_ready(&page).await > 0);
    assert!(page.polls.load(Ordering::SeqCst) >= 4);
}

#[tokio::test]
async fn image_wait_times_out_without_failing() {
    let (window, _listener) = channel(DEFAULT_SEARCH_ORIGIN, DEFAULT_HOST_ORIGIN);
    let agent = agent_with(Arc::new(window));
    let page = SlowPage {
        polls: AtomicUsize::new(0),
        ready_after: usize::MAX,
    };
    assert_eq!(agent.wait_until_ready(&page).await, 0);
}
