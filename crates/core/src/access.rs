//! Access guards deciding whether an operation may run for the current
//! session.
//!
//! Each front-end operation is tagged with an [`Access`] level; [`guard`]
//! turns that level plus the current [`AuthState`] into a
//! [`GuardDecision`].

use crate::error::CoreError;
use crate::session::Session;

/// Who may run an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Only for visitors who are not signed in (login, registration).
    Public,
    /// Any signed-in user.
    Private,
    /// Signed-in users holding the admin role.
    Admin,
}

/// What the caller knows about authentication right now.
#[derive(Debug, Clone, Copy)]
pub enum AuthState<'a> {
    /// Session lookup still in flight.
    Loading,
    Anonymous,
    Authenticated(&'a Session),
}

impl<'a> AuthState<'a> {
    pub fn from_session(session: Option<&'a Session>) -> Self {
        match session {
            Some(s) => Self::Authenticated(s),
            None => Self::Anonymous,
        }
    }

    fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    fn is_admin(&self) -> bool {
        matches!(self, Self::Authenticated(s) if s.is_admin())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Authentication state is not known yet; try again once it is.
    Wait,
    RedirectLogin,
    RedirectHome,
}

pub fn guard(access: Access, state: AuthState<'_>) -> GuardDecision {
    match access {
        Access::Public => {
            if state.is_authenticated() {
                GuardDecision::RedirectHome
            } else {
                GuardDecision::Allow
            }
        }
        Access::Private => match state {
            AuthState::Loading => GuardDecision::Wait,
            AuthState::Anonymous => GuardDecision::RedirectLogin,
            AuthState::Authenticated(_) => GuardDecision::Allow,
        },
        Access::Admin => match state {
            AuthState::Loading => GuardDecision::Wait,
            _ if state.is_admin() => GuardDecision::Allow,
            _ => GuardDecision::RedirectHome,
        },
    }
}

/// Turn a non-`Allow` decision into the error a headless caller reports.
pub fn enforce(access: Access, state: AuthState<'_>) -> Result<(), CoreError> {
    match guard(access, state) {
        GuardDecision::Allow => Ok(()),
        GuardDecision::Wait => Err(CoreError::Internal(
            "authentication state not resolved".into(),
        )),
        GuardDecision::RedirectLogin => Err(CoreError::Unauthorized(
            "sign in first with `sentinel login`".into(),
        )),
        GuardDecision::RedirectHome if access == Access::Public => Err(CoreError::Forbidden(
            "already signed in; run `sentinel logout` first".into(),
        )),
        GuardDecision::RedirectHome => Err(CoreError::Forbidden(
            "this operation requires the ADMIN role".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::LoginResponse;
    use assert_matches::assert_matches;

    fn session(role: Option<&str>) -> Session {
        let grant = LoginResponse {
            access_token: "t".into(),
            token_type: "bearer".into(),
            expires_in: None,
        };
        Session::from_login(&grant, chrono::Utc::now())
            .with_identity("u@x.pe", role.map(str::to_string))
    }

    #[test]
    fn private_requires_login() {
        let worker = session(Some("WORKER"));
        assert_eq!(guard(Access::Private, AuthState::Loading), GuardDecision::Wait);
        assert_eq!(
            guard(Access::Private, AuthState::Anonymous),
            GuardDecision::RedirectLogin
        );
        assert_eq!(
            guard(Access::Private, AuthState::Authenticated(&worker)),
            GuardDecision::Allow
        );
    }

    #[test]
    fn public_redirects_signed_in_users_home() {
        let worker = session(None);
        assert_eq!(guard(Access::Public, AuthState::Anonymous), GuardDecision::Allow);
        assert_eq!(guard(Access::Public, AuthState::Loading), GuardDecision::Allow);
        assert_eq!(
            guard(Access::Public, AuthState::Authenticated(&worker)),
            GuardDecision::RedirectHome
        );
    }

    #[test]
    fn admin_requires_admin_role() {
        let worker = session(Some("WORKER"));
        let admin = session(Some("ADMIN"));
        assert_eq!(guard(Access::Admin, AuthState::Loading), GuardDecision::Wait);
        assert_eq!(
            guard(Access::Admin, AuthState::Anonymous),
            GuardDecision::RedirectHome
        );
        assert_eq!(
            guard(Access::Admin, AuthState::Authenticated(&worker)),
            GuardDecision::RedirectHome
        );
        assert_eq!(
            guard(Access::Admin, AuthState::Authenticated(&admin)),
            GuardDecision::Allow
        );
    }

    #[test]
    fn enforce_maps_decisions_to_errors() {
        let worker = session(Some("WORKER"));
        assert_matches!(
            enforce(Access::Private, AuthState::Anonymous),
            Err(CoreError::Unauthorized(_))
        );
        assert_matches!(
            enforce(Access::Admin, AuthState::Authenticated(&worker)),
            Err(CoreError::Forbidden(_))
        );
        assert_matches!(
            enforce(Access::Public, AuthState::Authenticated(&worker)),
            Err(CoreError::Forbidden(msg)) if msg.contains("logout")
        );
        assert!(enforce(Access::Private, AuthState::from_session(Some(&worker))).is_ok());
    }
}
