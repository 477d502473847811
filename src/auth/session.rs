use actix_session::config::CookieContentSecurity;
use actix_session::{Session, SessionMiddleware, storage::CookieSessionStore};
use actix_web::HttpResponse;
use actix_web::cookie::Key;

use crate::models::report::DivisionScope;

pub const SESSION_COOKIE: &str = "registry_session";

/// Session keys written by the login service.
pub mod keys {
    pub const USER_ID: &str = "user_id";
    pub const OFFICE_CODE: &str = "office_code";
    pub const USERNAME: &str = "username";
    pub const OFFICE_NAME: &str = "office_name";
    pub const ROLE: &str = "role";
}

/// Office level a user works at. Each level has its own dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Ds,
    Gn,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "admin" => Some(Role::Admin),
            "ds" => Some(Role::Ds),
            "gn" => Some(Role::Gn),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Ds => "ds",
            Role::Gn => "gn",
        }
    }

    pub fn dashboard_path(self) -> &'static str {
        match self {
            Role::Admin => "/admin/dashboard",
            Role::Ds => "/ds/dashboard",
            Role::Gn => "/gn/dashboard",
        }
    }
}

/// Authenticated identity for one request, lifted out of the cookie session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: i64,
    pub office_code: String,
    pub username: String,
    pub office_name: String,
    pub role: Role,
}

impl SessionContext {
    /// `None` unless the session carries a user id, an office and a known role.
    pub fn from_session(session: &Session) -> Option<Self> {
        let user_id = session.get::<i64>(keys::USER_ID).unwrap_or(None)?;
        let office_code = session
            .get::<String>(keys::OFFICE_CODE)
            .unwrap_or(None)
            .filter(|code| !code.is_empty())?;
        let role = session
            .get::<String>(keys::ROLE)
            .unwrap_or(None)
            .and_then(|r| Role::parse(&r))?;
        let username = session.get::<String>(keys::USERNAME).unwrap_or(None).unwrap_or_default();
        let office_name = session.get::<String>(keys::OFFICE_NAME).unwrap_or(None).unwrap_or_default();

        Some(Self { user_id, office_code, username, office_name, role })
    }

    /// Data-access scope for this user's division. Every report query takes one.
    pub fn scope(&self) -> DivisionScope {
        DivisionScope::new(&self.office_code)
    }
}

/// Guard for role-specific pages.
/// No session sends the user to `login_path`; a different role goes to its own dashboard.
pub fn require_role(
    session: &Session,
    expected: Role,
    login_path: &str,
) -> Result<SessionContext, HttpResponse> {
    let Some(ctx) = SessionContext::from_session(session) else {
        log::debug!("No authenticated session, redirecting to {login_path}");
        return Err(redirect(login_path));
    };

    if ctx.role != expected {
        log::debug!(
            "User {} has role {}, expected {}; redirecting",
            ctx.user_id,
            ctx.role.as_str(),
            expected.as_str()
        );
        return Err(redirect(ctx.role.dashboard_path()));
    }

    Ok(ctx)
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish()
}

/// Cookie session middleware shared by the server and the integration tests.
pub fn session_middleware(key: Key, cookie_secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.to_string())
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .build()
}
