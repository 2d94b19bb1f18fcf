// Route table and role guard
// Declarative path-to-view mapping gated by the session's role

use crate::auth::{CurrentUser, Role, SessionState};

/// Destination screens of the dashboard shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Register,
    Home,
    EtudiantCandidature,
    EtudiantDashboard,
    EnseignantNotes,
    EnseignantModuleNotes,
    AdminValidations,
    AdminDashboard,
    DirectionStats,
    DirectionPerformance,
    DirectionRapports,
}

/// Who may enter a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    Protected(&'static [Role]),
}

pub const ALL_ROLES: &[Role] = &[
    Role::Etudiant,
    Role::Enseignant,
    Role::Admin,
    Role::Direction,
];

struct Route {
    pattern: &'static str,
    view: View,
    access: RouteAccess,
    /// Whether the view renders inside the shared navigation shell
    shell: bool,
}

/// Canonical route table. Segments starting with `:` are opaque path
/// parameters handed through to the destination view unparsed.
const ROUTES: &[Route] = &[
    Route {
        pattern: "/login",
        view: View::Login,
        access: RouteAccess::Public,
        shell: false,
    },
    Route {
        pattern: "/register",
        view: View::Register,
        access: RouteAccess::Public,
        shell: false,
    },
    Route {
        pattern: "/",
        view: View::Home,
        access: RouteAccess::Protected(ALL_ROLES),
        shell: true,
    },
    Route {
        pattern: "/etudiant/candidature",
        view: View::EtudiantCandidature,
        access: RouteAccess::Protected(&[Role::Etudiant]),
        shell: true,
    },
    Route {
        pattern: "/etudiant/dashboard",
        view: View::EtudiantDashboard,
        access: RouteAccess::Protected(&[Role::Etudiant]),
        shell: true,
    },
    Route {
        pattern: "/enseignant/notes",
        view: View::EnseignantNotes,
        access: RouteAccess::Protected(&[Role::Enseignant]),
        shell: true,
    },
    Route {
        pattern: "/enseignant/modules/:module_id",
        view: View::EnseignantModuleNotes,
        access: RouteAccess::Protected(&[Role::Enseignant]),
        shell: true,
    },
    Route {
        pattern: "/admin/validations",
        view: View::AdminValidations,
        access: RouteAccess::Protected(&[Role::Admin]),
        shell: true,
    },
    Route {
        pattern: "/admin/dashboard",
        view: View::AdminDashboard,
        access: RouteAccess::Protected(&[Role::Admin]),
        shell: true,
    },
    Route {
        pattern: "/direction/stats",
        view: View::DirectionStats,
        access: RouteAccess::Protected(&[Role::Direction]),
        shell: true,
    },
    Route {
        pattern: "/direction/performance",
        view: View::DirectionPerformance,
        access: RouteAccess::Protected(&[Role::Direction]),
        shell: true,
    },
    Route {
        pattern: "/direction/rapports",
        view: View::DirectionRapports,
        access: RouteAccess::Protected(&[Role::Direction]),
        shell: true,
    },
];

/// Guard decision for a single route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    RedirectToLogin,
}

/// Pure role check. Unauthenticated and unauthorized-role both redirect to
/// the login entry point; the system models no separate forbidden page.
pub fn check_access(user: Option<&CurrentUser>, required: &[Role]) -> Access {
    match user {
        Some(user) if required.contains(&user.role) => Access::Allow,
        _ => Access::RedirectToLogin,
    }
}

/// Outcome of resolving a path against the current session
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    /// Session not yet restored: no decision may be rendered.
    /// Avoids a flash of the login page on reload.
    Pending,
    Render {
        view: View,
        params: Vec<(String, String)>,
        shell: bool,
    },
    RedirectToLogin,
}

/// Resolve a path to a navigation outcome. Unmatched paths fall through to
/// the login redirect (the wildcard route).
pub fn resolve(path: &str, session: &SessionState) -> Navigation {
    for route in ROUTES {
        let params = match match_pattern(route.pattern, path) {
            Some(params) => params,
            None => continue,
        };

        return match route.access {
            RouteAccess::Public => Navigation::Render {
                view: route.view,
                params,
                shell: route.shell,
            },
            RouteAccess::Protected(required) => {
                if *session == SessionState::Unknown {
                    return Navigation::Pending;
                }
                match check_access(session.current_user(), required) {
                    Access::Allow => Navigation::Render {
                        view: route.view,
                        params,
                        shell: route.shell,
                    },
                    Access::RedirectToLogin => Navigation::RedirectToLogin,
                }
            }
        };
    }

    Navigation::RedirectToLogin
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Match a path against a pattern, extracting `:name` segments.
/// Trailing slashes are insignificant.
fn match_pattern(pattern: &str, path: &str) -> Option<Vec<(String, String)>> {
    let pattern_segs = segments(pattern);
    let path_segs = segments(path);

    if pattern_segs.len() != path_segs.len() {
        return None;
    }

    let mut params = Vec::new();
    for (expected, actual) in pattern_segs.iter().zip(path_segs.iter()) {
        if let Some(name) = expected.strip_prefix(':') {
            params.push((name.to_string(), actual.to_string()));
        } else if expected != actual {
            return None;
        }
    }

    Some(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> CurrentUser {
        CurrentUser {
            role,
            username: "someone".to_string(),
        }
    }

    fn authenticated(role: Role) -> SessionState {
        SessionState::Authenticated(user(role))
    }

    #[test]
    fn test_guard_allows_iff_role_in_required_set() {
        let roles = [Role::Etudiant, Role::Enseignant, Role::Admin, Role::Direction];
        for required in roles {
            for actual in roles {
                let u = user(actual);
                let expected = if actual == required {
                    Access::Allow
                } else {
                    Access::RedirectToLogin
                };
                assert_eq!(check_access(Some(&u), &[required]), expected);
            }
            assert_eq!(check_access(None, &[required]), Access::RedirectToLogin);
        }
    }

    #[test]
    fn test_guard_with_multi_role_set() {
        let u = user(Role::Direction);
        assert_eq!(check_access(Some(&u), ALL_ROLES), Access::Allow);
        assert_eq!(
            check_access(Some(&u), &[Role::Admin, Role::Enseignant]),
            Access::RedirectToLogin
        );
    }

    #[test]
    fn test_public_routes_ignore_session() {
        for state in [SessionState::Anonymous, authenticated(Role::Admin)] {
            match resolve("/login", &state) {
                Navigation::Render { view, shell, .. } => {
                    assert_eq!(view, View::Login);
                    assert!(!shell);
                }
                other => panic!("expected Render, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_protected_route_allows_matching_role() {
        match resolve("/admin/validations", &authenticated(Role::Admin)) {
            Navigation::Render { view, shell, .. } => {
                assert_eq!(view, View::AdminValidations);
                assert!(shell);
            }
            other => panic!("expected Render, got {:?}", other),
        }
    }

    #[test]
    fn test_protected_route_redirects_wrong_role_and_anonymous() {
        assert_eq!(
            resolve("/admin/validations", &authenticated(Role::Etudiant)),
            Navigation::RedirectToLogin
        );
        assert_eq!(
            resolve("/admin/validations", &SessionState::Anonymous),
            Navigation::RedirectToLogin
        );
    }

    #[test]
    fn test_home_admits_any_authenticated_role() {
        for role in [Role::Etudiant, Role::Enseignant, Role::Admin, Role::Direction] {
            match resolve("/", &authenticated(role)) {
                Navigation::Render { view, .. } => assert_eq!(view, View::Home),
                other => panic!("expected Render for {:?}, got {:?}", role, other),
            }
        }
        assert_eq!(
            resolve("/", &SessionState::Anonymous),
            Navigation::RedirectToLogin
        );
    }

    #[test]
    fn test_unknown_session_yields_pending_not_redirect() {
        assert_eq!(
            resolve("/etudiant/dashboard", &SessionState::Unknown),
            Navigation::Pending
        );
        // Public routes render regardless
        assert!(matches!(
            resolve("/login", &SessionState::Unknown),
            Navigation::Render { .. }
        ));
    }

    #[test]
    fn test_path_param_passed_through_opaque() {
        match resolve("/enseignant/modules/42", &authenticated(Role::Enseignant)) {
            Navigation::Render { view, params, .. } => {
                assert_eq!(view, View::EnseignantModuleNotes);
                assert_eq!(params, vec![("module_id".to_string(), "42".to_string())]);
            }
            other => panic!("expected Render, got {:?}", other),
        }

        // Non-numeric values are not validated by the router
        match resolve("/enseignant/modules/abc", &authenticated(Role::Enseignant)) {
            Navigation::Render { params, .. } => {
                assert_eq!(params[0].1, "abc");
            }
            other => panic!("expected Render, got {:?}", other),
        }
    }

    #[test]
    fn test_wildcard_fallback_redirects_to_login() {
        assert_eq!(
            resolve("/nonexistent", &authenticated(Role::Admin)),
            Navigation::RedirectToLogin
        );
        assert_eq!(
            resolve("/etudiant/unknown/deep", &authenticated(Role::Etudiant)),
            Navigation::RedirectToLogin
        );
    }

    #[test]
    fn test_trailing_slash_insignificant() {
        assert!(matches!(
            resolve("/direction/stats/", &authenticated(Role::Direction)),
            Navigation::Render { view: View::DirectionStats, .. }
        ));
    }
}
