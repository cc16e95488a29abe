use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::*;

/// Scripted page contents and failure switches shared by a launcher and
/// every session it hands out.
#[derive(Default)]
struct Script {
    texts: HashMap<&'static str, &'static str>,
    images: HashMap<&'static str, &'static str>,
    present: HashSet<&'static str>,
    fail_launch: bool,
    fail_navigation: bool,
    never_ready: bool,
    hang_navigation: bool,
    broken_reads: HashSet<&'static str>,
}

#[derive(Default)]
struct Calls {
    launches: AtomicUsize,
    closes: AtomicUsize,
    clicks: AtomicUsize,
    visited: Mutex<Vec<String>>,
}

#[derive(Clone)]
struct ScriptedLauncher {
    script: Arc<Script>,
    calls: Arc<Calls>,
}

struct ScriptedSession {
    script: Arc<Script>,
    calls: Arc<Calls>,
}

impl ScriptedLauncher {
    fn new(script: Script) -> Self {
        Self {
            script: Arc::new(script),
            calls: Arc::new(Calls::default()),
        }
    }
}

#[async_trait]
impl BrowserLauncher for ScriptedLauncher {
    type Session = ScriptedSession;

    async fn launch(&self) -> Result<ScriptedSession, FetchError> {
        self.calls.launches.fetch_add(1, Ordering::SeqCst);
        if self.script.fail_launch {
            return Err(FetchError::Launch("chrome binary not found".to_string()));
        }
        Ok(ScriptedSession {
            script: Arc::clone(&self.script),
            calls: Arc::clone(&self.calls),
        })
    }
}

impl ScriptedSession {
    fn check_read(&self, selector: &str) -> Result<(), FetchError> {
        if self.script.broken_reads.contains(selector) {
            return Err(FetchError::Browser(format!("detached node for {selector}")));
        }
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), FetchError> {
        self.calls.visited.lock().unwrap().push(url.to_string());
        if self.script.hang_navigation {
            tokio::time::sleep(timeout * 10).await;
        }
        if self.script.fail_navigation {
            return Err(FetchError::Navigation {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        Ok(())
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), FetchError> {
        if self.script.never_ready {
            return Err(FetchError::SelectorTimeout {
                selector: selector.to_string(),
                timeout_secs: timeout.as_secs(),
            });
        }
        Ok(())
    }

    async fn wait_for_navigation(&mut self, _timeout: Duration) -> Result<(), FetchError> {
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<bool, FetchError> {
        let present = self.script.present.contains(selector);
        if present {
            self.calls.clicks.fetch_add(1, Ordering::SeqCst);
        }
        Ok(present)
    }

    async fn text(&mut self, selector: &str) -> Result<Option<String>, FetchError> {
        self.check_read(selector)?;
        Ok(self.script.texts.get(selector).map(|s| (*s).to_string()))
    }

    async fn image_source(&mut self, selector: &str) -> Result<Option<String>, FetchError> {
        self.check_read(selector)?;
        Ok(self.script.images.get(selector).map(|s| (*s).to_string()))
    }

    async fn exists(&mut self, selector: &str) -> Result<bool, FetchError> {
        self.check_read(selector)?;
        Ok(self.script.present.contains(selector))
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        self.calls.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn settings() -> FetcherSettings {
    FetcherSettings {
        profile_base_url: "https://www.instagram.com".to_string(),
        navigation_timeout: Duration::from_secs(30),
        selector_timeout: Duration::from_secs(10),
        deadline: Duration::from_secs(60),
    }
}

fn nike_page() -> Script {
    Script {
        texts: HashMap::from([
            (selectors::DISPLAY_NAME, "nike"),
            (selectors::BIO, "Just Do It."),
            (selectors::POSTS, "1,589"),
            (selectors::FOLLOWERS, "302M"),
            (selectors::FOLLOWING, "152"),
        ]),
        images: HashMap::from([("header img", "https://scontent.cdninstagram.com/v/nike.jpg")]),
        present: HashSet::from([r#"svg[aria-label="Verified"]"#]),
        ..Script::default()
    }
}

#[test]
fn profile_url_appends_username_with_trailing_slash() {
    let fetcher = ProfileFetcher::new(ScriptedLauncher::new(Script::default()), settings());
    assert_eq!(
        fetcher.profile_url("nike").unwrap(),
        "https://www.instagram.com/nike/"
    );
}

#[test]
fn profile_url_encodes_path_characters() {
    let fetcher = ProfileFetcher::new(ScriptedLauncher::new(Script::default()), settings());
    assert_eq!(
        fetcher.profile_url("a/b").unwrap(),
        "https://www.instagram.com/a%2Fb/"
    );
}

#[test]
fn profile_url_rejects_unusable_base() {
    let mut settings = settings();
    settings.profile_base_url = "not a url".to_string();
    let fetcher = ProfileFetcher::new(ScriptedLauncher::new(Script::default()), settings);
    assert!(matches!(
        fetcher.profile_url("nike"),
        Err(FetchError::Navigation { .. })
    ));
}

#[tokio::test]
async fn fetch_extracts_every_field() {
    let launcher = ScriptedLauncher::new(nike_page());
    let calls = Arc::clone(&launcher.calls);
    let fetcher = ProfileFetcher::new(launcher, settings());

    let snapshot = fetcher.fetch("nike").await.expect("fetch should succeed");

    assert_eq!(snapshot.username, "nike");
    assert_eq!(snapshot.bio, "Just Do It.");
    assert_eq!(snapshot.posts, "1,589");
    assert_eq!(snapshot.followers, "302M");
    assert_eq!(snapshot.followers_count, 302_000_000);
    assert_eq!(snapshot.following_count, 152);
    assert!(snapshot.verified);
    assert_eq!(
        snapshot.avatar.as_deref(),
        Some("https://scontent.cdninstagram.com/v/nike.jpg")
    );
    assert_eq!(calls.launches.load(Ordering::SeqCst), 1);
    assert_eq!(calls.closes.load(Ordering::SeqCst), 1);
    assert_eq!(
        calls.visited.lock().unwrap().as_slice(),
        ["https://www.instagram.com/nike/"]
    );
}

#[tokio::test]
async fn fetch_does_not_normalize_username() {
    let launcher = ScriptedLauncher::new(Script::default());
    let calls = Arc::clone(&launcher.calls);
    let fetcher = ProfileFetcher::new(launcher, settings());

    fetcher.fetch("Nike").await.expect("fetch should succeed");

    assert_eq!(
        calls.visited.lock().unwrap().as_slice(),
        ["https://www.instagram.com/Nike/"]
    );
}

#[tokio::test]
async fn missing_fields_fall_back_to_defaults() {
    let fetcher = ProfileFetcher::new(ScriptedLauncher::new(Script::default()), settings());

    let snapshot = fetcher.fetch("ghost").await.expect("fetch should succeed");

    assert_eq!(snapshot.username, "ghost");
    assert_eq!(snapshot.bio, "");
    assert_eq!(snapshot.followers, "0");
    assert_eq!(snapshot.followers_count, 0);
    assert!(snapshot.avatar.is_none());
    assert!(!snapshot.verified);
}

#[tokio::test]
async fn failing_field_reads_do_not_abort_the_fetch() {
    let mut script = nike_page();
    script.broken_reads = HashSet::from([selectors::BIO, selectors::FOLLOWERS]);
    let fetcher = ProfileFetcher::new(ScriptedLauncher::new(script), settings());

    let snapshot = fetcher.fetch("nike").await.expect("fetch should succeed");

    assert_eq!(snapshot.bio, "");
    assert_eq!(snapshot.followers, "0");
    assert_eq!(snapshot.posts, "1,589");
}

#[tokio::test]
async fn avatar_falls_back_to_secondary_selectors() {
    let mut script = nike_page();
    script.images = HashMap::from([("img._aadp", "https://scontent.cdninstagram.com/v/alt.jpg")]);
    let fetcher = ProfileFetcher::new(ScriptedLauncher::new(script), settings());

    let snapshot = fetcher.fetch("nike").await.unwrap();

    assert_eq!(
        snapshot.avatar.as_deref(),
        Some("https://scontent.cdninstagram.com/v/alt.jpg")
    );
}

#[tokio::test]
async fn malformed_avatar_is_dropped_without_failing() {
    let mut script = nike_page();
    script.images = HashMap::from([("header img", "::not-a-url::")]);
    let fetcher = ProfileFetcher::new(ScriptedLauncher::new(script), settings());

    let snapshot = fetcher.fetch("nike").await.expect("fetch should succeed");

    assert!(snapshot.avatar.is_none());
}

#[tokio::test]
async fn private_account_banner_uses_page_title_heading() {
    let mut script = nike_page();
    script
        .texts
        .insert(selectors::DISPLAY_NAME, "Esta conta é privada");
    script
        .texts
        .insert(selectors::PRIVATE_DISPLAY_NAME, "secret.club");
    let fetcher = ProfileFetcher::new(ScriptedLauncher::new(script), settings());

    let snapshot = fetcher.fetch("secret.club").await.unwrap();

    assert_eq!(snapshot.username, "secret.club");
}

#[tokio::test]
async fn localized_verified_badge_is_detected() {
    let mut script = nike_page();
    script.present = HashSet::from([r#"svg[aria-label="Verificado"]"#]);
    let fetcher = ProfileFetcher::new(ScriptedLauncher::new(script), settings());

    assert!(fetcher.fetch("nike").await.unwrap().verified);
}

#[tokio::test]
async fn cookie_prompt_is_dismissed_when_present() {
    let mut script = nike_page();
    script.present.insert(selectors::COOKIE_CONSENT_BUTTON);
    let launcher = ScriptedLauncher::new(script);
    let calls = Arc::clone(&launcher.calls);
    let fetcher = ProfileFetcher::new(launcher, settings());

    fetcher.fetch("nike").await.unwrap();

    assert_eq!(calls.clicks.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn navigation_failure_closes_session_once() {
    let mut script = nike_page();
    script.fail_navigation = true;
    let launcher = ScriptedLauncher::new(script);
    let calls = Arc::clone(&launcher.calls);
    let fetcher = ProfileFetcher::new(launcher, settings());

    let err = fetcher.fetch("nike").await.unwrap_err();

    assert!(
        matches!(err, FetchError::Navigation { ref message, .. } if message.contains("ERR_NAME_NOT_RESOLVED")),
        "got: {err:?}"
    );
    assert_eq!(calls.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn selector_timeout_closes_session_once() {
    let mut script = nike_page();
    script.never_ready = true;
    let launcher = ScriptedLauncher::new(script);
    let calls = Arc::clone(&launcher.calls);
    let fetcher = ProfileFetcher::new(launcher, settings());

    let err = fetcher.fetch("nike").await.unwrap_err();

    assert!(matches!(
        err,
        FetchError::SelectorTimeout { ref selector, timeout_secs: 10 } if selector == "header img"
    ));
    assert_eq!(calls.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn launch_failure_is_reported_without_close() {
    let mut script = nike_page();
    script.fail_launch = true;
    let launcher = ScriptedLauncher::new(script);
    let calls = Arc::clone(&launcher.calls);
    let fetcher = ProfileFetcher::new(launcher, settings());

    let err = fetcher.fetch("nike").await.unwrap_err();

    assert!(matches!(err, FetchError::Launch(ref m) if m.contains("chrome")));
    assert_eq!(calls.closes.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn deadline_expiry_still_closes_session() {
    let mut script = nike_page();
    script.hang_navigation = true;
    let launcher = ScriptedLauncher::new(script);
    let calls = Arc::clone(&launcher.calls);
    let mut settings = settings();
    settings.deadline = Duration::from_secs(5);
    let fetcher = ProfileFetcher::new(launcher, settings);

    let err = fetcher.fetch("nike").await.unwrap_err();

    assert!(matches!(err, FetchError::DeadlineExceeded { timeout_secs: 5 }));
    assert_eq!(calls.closes.load(Ordering::SeqCst), 1);
}
