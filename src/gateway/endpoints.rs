// src/gateway/endpoints.rs
// Backend route table

/// Static routes of the expense-tracker backend, relative to the base URL
pub mod paths {
    pub const CSRF_TOKEN: &str = "/get-csrf-token/";
    pub const REGISTER: &str = "/register/";
    pub const LOGIN: &str = "/auth/token/";
    pub const REFRESH: &str = "/auth/token/refresh/";
    pub const PASSWORD_RESET: &str = "/auth/password_reset/";
    pub const PASSWORD_RESET_CONFIRM: &str = "/auth/password_reset/confirm/";
    pub const LOGOUT: &str = "/logout/";
    pub const IS_LOGGED_IN: &str = "/is-logged-in/";
    pub const RESEND_ACTIVATION: &str = "/resend-activation/";
    pub const ACTIVATE: &str = "/activate/";
    pub const CATEGORIES: &str = "/categories/";
    pub const EXPENSES: &str = "/expenses/";
    pub const EXPENSE_SUMMARY: &str = "/expenses/summary/";
    pub const MODERATOR_USERS: &str = "/moderator/users/";
}

const STATIC_ROUTES: &[&str] = &[
    paths::CSRF_TOKEN,
    paths::REGISTER,
    paths::LOGIN,
    paths::REFRESH,
    paths::PASSWORD_RESET,
    paths::PASSWORD_RESET_CONFIRM,
    paths::LOGOUT,
    paths::IS_LOGGED_IN,
    paths::RESEND_ACTIVATION,
    paths::ACTIVATE,
    paths::CATEGORIES,
    paths::EXPENSES,
    paths::EXPENSE_SUMMARY,
    paths::MODERATOR_USERS,
];

/// Collections whose members are addressed as `{prefix}{id}/`
const DETAIL_PREFIXES: &[&str] = &[paths::EXPENSES, paths::MODERATOR_USERS];

/// `/expenses/{id}/`
pub fn expense_detail(id: i64) -> String {
    format!("{}{}/", paths::EXPENSES, id)
}

/// `/moderator/users/{id}/`
pub fn moderator_user_detail(id: i64) -> String {
    format!("{}{}/", paths::MODERATOR_USERS, id)
}

/// Whether `endpoint` names a route the backend serves.
///
/// Query strings are ignored; detail routes need a numeric id.
pub fn is_known(endpoint: &str) -> bool {
    let path = endpoint.split_once('?').map_or(endpoint, |(p, _)| p);

    if STATIC_ROUTES.contains(&path) {
        return true;
    }

    DETAIL_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix('/'))
            .is_some_and(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
    })
}

/// The probe endpoint never triggers a session refresh
pub fn is_session_probe(endpoint: &str) -> bool {
    endpoint.split_once('?').map_or(endpoint, |(p, _)| p) == paths::IS_LOGGED_IN
}
