//! Per-field profile extraction and the default policy applied to it.

use rateboard_core::ProfileSnapshot;
use url::Url;

use crate::error::FetchError;
use crate::selectors;
use crate::session::BrowserSession;

/// Count shown when a count element could not be read.
const MISSING_COUNT: &str = "0";

const AVATAR_HOST_SUFFIXES: &[&str] = &["instagram.com", "cdninstagram.com", "fbcdn.net"];

/// Raw values read from a profile page. `None` means the read failed or the
/// element was absent; [`ExtractedFields::into_snapshot`] decides what each
/// gap becomes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub avatar: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub posts: Option<String>,
    pub followers: Option<String>,
    pub following: Option<String>,
    pub verified: Option<bool>,
}

impl ExtractedFields {
    /// Reads every field independently. A failing read never aborts the
    /// others.
    pub async fn read<S: BrowserSession + ?Sized>(session: &mut S) -> Self {
        let mut avatar = None;
        for selector in selectors::AVATAR {
            avatar = non_empty(best_effort("avatar", session.image_source(selector).await));
            if avatar.is_some() {
                break;
            }
        }

        let mut display_name = non_empty(best_effort(
            "display_name",
            session.text(selectors::DISPLAY_NAME).await,
        ));
        if display_name.as_deref().is_some_and(is_private_banner) {
            display_name = non_empty(best_effort(
                "display_name",
                session.text(selectors::PRIVATE_DISPLAY_NAME).await,
            ));
        }

        let bio = best_effort("bio", session.text(selectors::BIO).await);
        let posts = non_empty(best_effort("posts", session.text(selectors::POSTS).await));
        let followers = non_empty(best_effort(
            "followers",
            session.text(selectors::FOLLOWERS).await,
        ));
        let following = non_empty(best_effort(
            "following",
            session.text(selectors::FOLLOWING).await,
        ));

        let mut verified = None;
        for selector in selectors::VERIFIED_BADGES {
            match session.exists(selector).await {
                Ok(true) => {
                    verified = Some(true);
                    break;
                }
                Ok(false) => verified = Some(false),
                Err(e) => tracing::debug!(field = "verified", error = %e, "field read failed"),
            }
        }

        Self {
            avatar,
            display_name,
            bio,
            posts,
            followers,
            following,
            verified,
        }
    }

    /// Applies the per-field defaults: the requested username stands in for
    /// a missing display name, counts default to `"0"`, the bio to empty and
    /// the badge to unverified. Malformed avatar URLs are dropped.
    #[must_use]
    pub fn into_snapshot(self, requested_username: &str) -> ProfileSnapshot {
        ProfileSnapshot::new(
            self.avatar.as_deref().and_then(validate_avatar_url),
            self.display_name
                .unwrap_or_else(|| requested_username.to_string()),
            self.bio.unwrap_or_default(),
            self.posts.unwrap_or_else(|| MISSING_COUNT.to_string()),
            self.followers.unwrap_or_else(|| MISSING_COUNT.to_string()),
            self.following.unwrap_or_else(|| MISSING_COUNT.to_string()),
            self.verified.unwrap_or(false),
        )
    }
}

/// Returns the avatar URL if it parses as an absolute http(s) URL.
#[must_use]
pub fn validate_avatar_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let parsed = match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url,
        Ok(url) => {
            tracing::warn!(avatar = raw, scheme = url.scheme(), "discarding non-http avatar URL");
            return None;
        }
        Err(e) => {
            tracing::warn!(avatar = raw, error = %e, "discarding malformed avatar URL");
            return None;
        }
    };

    let on_known_cdn = parsed.host_str().is_some_and(|host| {
        AVATAR_HOST_SUFFIXES
            .iter()
            .any(|suffix| host == *suffix || host.ends_with(&format!(".{suffix}")))
    });
    if !on_known_cdn {
        tracing::debug!(avatar = raw, "avatar served from an unexpected host");
    }

    Some(raw.to_string())
}

fn is_private_banner(heading: &str) -> bool {
    selectors::PRIVATE_ACCOUNT_BANNERS
        .iter()
        .any(|banner| heading.trim().eq_ignore_ascii_case(banner))
}

fn best_effort(field: &'static str, read: Result<Option<String>, FetchError>) -> Option<String> {
    match read {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(field, error = %e, "field read failed");
            None
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
