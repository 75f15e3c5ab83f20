//! Page-load gate: which pages need a logged-in user.

/// A page of the tracker, identified by its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Login,
    Register,
    Details,
    ForgotPassword,
    /// Any other page (dashboard, expenses, profile, ...).
    Protected(String),
}

impl Page {
    /// Identify a page from a URL path; only the last segment matters.
    pub fn from_path(path: &str) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path);
        match name {
            "login.html" => Page::Login,
            "register.html" => Page::Register,
            "details.html" => Page::Details,
            "forgot_password.html" => Page::ForgotPassword,
            other => Page::Protected(other.to_string()),
        }
    }

    pub fn is_public(&self) -> bool {
        !matches!(self, Page::Protected(_))
    }

    pub fn file_name(&self) -> &str {
        match self {
            Page::Login => "login.html",
            Page::Register => "register.html",
            Page::Details => "details.html",
            Page::ForgotPassword => "forgot_password.html",
            Page::Protected(name) => name,
        }
    }
}

/// Outcome of loading a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(Page),
}

/// Protected pages require at least one registered account and a session
/// marker; otherwise the load is sent to the login page.
pub fn decide(page: &Page, has_accounts: bool, logged_in: bool) -> Access {
    if page.is_public() || (has_accounts && logged_in) {
        Access::Allow
    } else {
        Access::Redirect(Page::Login)
    }
}
