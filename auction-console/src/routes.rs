// Static route policy table for front-ends: which paths require a
// login and which render inside the app chrome.

// ---------------------------------------------------------------------------
// Route tables
// ---------------------------------------------------------------------------

/// Reachable without a login.
pub const PUBLIC_ROUTES: &[&str] = &[
    "/login",
    "/register",
    "/player-registration-public",
    "/teams",
    "/players",
];

/// Require a login; unauthenticated visitors are sent to /login.
pub const PROTECTED_ROUTES: &[&str] = &["/", "/auction", "/analytics", "/admin"];

/// Render full-screen with no navigation chrome, logged in or not.
pub const STANDALONE_ROUTES: &[&str] = &["/login", "/register", "/player-registration-public"];

/// Show chrome only for logged-in visitors.
pub const CONDITIONAL_CHROME_ROUTES: &[&str] = &[
    "/player-registration",
    "/player-registration-enhanced",
    "/teams",
    "/players",
];

/// Resolved policy for one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutePolicy {
    pub requires_auth: bool,
    pub show_chrome: bool,
}

/// Prefix match in the usual route sense: `/teams` matches `/teams`
/// and `/teams/5` but not `/teamsheet`. The root path only matches
/// exactly.
fn matches_route(path: &str, route: &str) -> bool {
    if route == "/" {
        return path == "/";
    }
    path == route || (path.starts_with(route) && path.as_bytes().get(route.len()) == Some(&b'/'))
}

fn in_table(path: &str, table: &[&str]) -> bool {
    table.iter().any(|route| matches_route(path, route))
}

pub fn is_public_route(path: &str) -> bool {
    in_table(path, PUBLIC_ROUTES)
}

pub fn is_standalone_route(path: &str) -> bool {
    in_table(path, STANDALONE_ROUTES)
}

/// Resolve a path to its access and layout policy. Unknown paths fall
/// back to the protected default so nothing ships open by accident.
pub fn resolve(path: &str, authenticated: bool) -> RoutePolicy {
    let requires_auth = !is_public_route(path) || in_table(path, PROTECTED_ROUTES);
    let show_chrome = if is_standalone_route(path) {
        false
    } else if in_table(path, CONDITIONAL_CHROME_ROUTES) {
        authenticated
    } else {
        true
    };
    RoutePolicy { requires_auth, show_chrome }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_routes_do_not_require_auth() {
        for route in ["/login", "/register", "/teams", "/players", "/player-registration-public"] {
            assert!(!resolve(route, false).requires_auth, "{route} should be public");
        }
    }

    #[test]
    fn protected_routes_require_auth() {
        for route in ["/", "/auction", "/analytics", "/admin"] {
            assert!(resolve(route, false).requires_auth, "{route} should be protected");
        }
    }

    #[test]
    fn unknown_routes_default_to_protected() {
        assert!(resolve("/secret-panel", false).requires_auth);
    }

    #[test]
    fn prefix_matching_respects_segment_boundaries() {
        assert!(is_public_route("/teams"));
        assert!(is_public_route("/teams/5"));
        assert!(!is_public_route("/teamsheet"));
    }

    #[test]
    fn root_only_matches_exactly() {
        assert!(resolve("/", false).requires_auth);
        // "/auction" must not match the "/" entry by prefix.
        assert!(!is_public_route("/"));
    }

    #[test]
    fn standalone_routes_never_show_chrome() {
        assert!(!resolve("/login", false).show_chrome);
        assert!(!resolve("/login", true).show_chrome);
        assert!(!resolve("/register/step2", true).show_chrome);
    }

    #[test]
    fn conditional_routes_show_chrome_only_when_logged_in() {
        assert!(!resolve("/teams", false).show_chrome);
        assert!(resolve("/teams", true).show_chrome);
        assert!(!resolve("/player-registration", false).show_chrome);
        assert!(resolve("/player-registration-enhanced", true).show_chrome);
    }

    #[test]
    fn protected_app_pages_always_show_chrome() {
        assert!(resolve("/auction", true).show_chrome);
        assert!(resolve("/admin", true).show_chrome);
    }
}
