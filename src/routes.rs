// Navigation guard for the bookmark app's pages.
// Decides, per request path and sign-in state, whether to serve the page or redirect.

use tracing::warn;

use crate::types::settings::AuthSettings;

pub const HOME_PATH: &str = "/";
pub const DASHBOARD_PATH: &str = "/dashboard";

const ASSET_PREFIXES: &[&str] = &["/_next/static", "/_next/image", "/favicon.ico"];
const IMAGE_EXTENSIONS: &[&str] = &[".svg", ".png", ".jpg", ".jpeg", ".gif", ".webp"];

/// Outcome of the guard for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Continue,
    Redirect(&'static str),
}

/// What the landing page hands to the OAuth provider on "Sign in".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInRequest {
    pub provider: String,
    pub redirect_to: String,
    pub query_params: Vec<(&'static str, &'static str)>,
}

/// Whether the guard runs for this path at all. Static assets and images skip it.
pub fn is_guarded(path: &str) -> bool {
    if ASSET_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return false;
    }
    let lower = path.to_ascii_lowercase();
    !IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Route guard configured from the `auth` settings section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    provider: String,
    callback_path: String,
}

impl RouteGuard {
    /// Builds the guard from settings.
    ///
    /// A callback path that is not an absolute path below `/` would let every
    /// request through, so it falls back to the default one.
    pub fn from_settings(auth: &AuthSettings) -> Self {
        let defaults = AuthSettings::default();
        let path = auth.redirect_path.trim_end_matches('/');
        let callback_path = if path.starts_with('/') && path.len() > 1 {
            path.to_string()
        } else {
            warn!(redirect_path = %auth.redirect_path, "unusable auth callback path, using default");
            defaults.redirect_path
        };
        let provider = if auth.provider.trim().is_empty() {
            warn!("empty auth provider, using default");
            defaults.provider
        } else {
            auth.provider.trim().to_string()
        };

        Self { provider, callback_path }
    }

    pub fn callback_path(&self) -> &str {
        &self.callback_path
    }

    /// Decides what to do with a request for `path`.
    ///
    /// The auth callback always passes so the code exchange can finish. The
    /// dashboard requires a session; the landing page sends signed-in users on
    /// to the dashboard.
    pub fn decide(&self, path: &str, signed_in: bool) -> RouteDecision {
        if !is_guarded(path) || self.is_callback(path) {
            return RouteDecision::Continue;
        }
        if path.starts_with(DASHBOARD_PATH) && !signed_in {
            return RouteDecision::Redirect(HOME_PATH);
        }
        if path == HOME_PATH && signed_in {
            return RouteDecision::Redirect(DASHBOARD_PATH);
        }
        RouteDecision::Continue
    }

    /// OAuth request for a sign-in started from `origin` (e.g. `https://app.example`).
    pub fn sign_in_request(&self, origin: &str) -> SignInRequest {
        SignInRequest {
            provider: self.provider.clone(),
            redirect_to: format!("{}{}", origin.trim_end_matches('/'), self.callback_path),
            query_params: vec![("access_type", "offline"), ("prompt", "consent")],
        }
    }

    fn is_callback(&self, path: &str) -> bool {
        match path.strip_prefix(self.callback_path.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('?') || rest.starts_with('/'),
            None => false,
        }
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::from_settings(&AuthSettings::default())
    }
}
