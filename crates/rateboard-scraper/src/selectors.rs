//! DOM locations read from a public profile page.
//!
//! Class-based selectors track the current markup and are expected to drift;
//! every read through them is best-effort.

/// Consent dialog submit button shown to cookie-less visitors in some regions.
pub const COOKIE_CONSENT_BUTTON: &str = r#"button[type="submit"]"#;

/// Present once the profile header has rendered.
pub const PROFILE_READY: &str = "header img";

/// Tried in order; the first non-empty `src` wins.
pub const AVATAR: &[&str] = &[
    "header img",
    r#"img[data-testid="user-avatar"]"#,
    "img._aadp",
];

pub const DISPLAY_NAME: &str = "h2";

/// Fallback heading when [`DISPLAY_NAME`] holds a private-account banner.
pub const PRIVATE_DISPLAY_NAME: &str = "h1";

/// Banner texts rendered in place of the handle on private accounts.
pub const PRIVATE_ACCOUNT_BANNERS: &[&str] = &["This account is private", "Esta conta é privada"];

pub const BIO: &str = "span._ap3a._aaco._aacu._aacx._aad7._aade";

pub const POSTS: &str = "ul li:nth-child(1) span";
pub const FOLLOWERS: &str = "ul li:nth-child(2) span";
pub const FOLLOWING: &str = "ul li:nth-child(3) span";

/// Verified badge, labelled per UI locale.
pub const VERIFIED_BADGES: &[&str] = &[
    r#"svg[aria-label="Verified"]"#,
    r#"svg[aria-label="Verificado"]"#,
];
