//! Static route table and path matching.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
/// Query parameter carrying the intended destination across the login detour.
pub const REDIRECT_PARAM: &str = "redirect";

/// Views the client can show. Rendering lives elsewhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    Login,
    Register,
    Search,
    AiChat,
    SmartMatch,
    RequirementDetail,
    MatchProposal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteDescriptor {
    /// Pattern; `:name` segments match any single non-empty segment.
    pub path: &'static str,
    pub name: &'static str,
    pub view: View,
    pub requires_auth: bool,
}

pub static ROUTES: &[RouteDescriptor] = &[
    RouteDescriptor { path: HOME_PATH, name: "Home", view: View::Home, requires_auth: false },
    RouteDescriptor { path: LOGIN_PATH, name: "Login", view: View::Login, requires_auth: false },
    RouteDescriptor { path: "/register", name: "Register", view: View::Register, requires_auth: false },
    RouteDescriptor { path: "/search", name: "Search", view: View::Search, requires_auth: true },
    RouteDescriptor { path: "/ai-chat", name: "AiChat", view: View::AiChat, requires_auth: true },
    RouteDescriptor { path: "/smart-match", name: "SmartMatch", view: View::SmartMatch, requires_auth: true },
    RouteDescriptor {
        path: "/requirement/:id",
        name: "RequirementDetail",
        view: View::RequirementDetail,
        requires_auth: true,
    },
    RouteDescriptor { path: "/proposal/:id", name: "MatchProposal", view: View::MatchProposal, requires_auth: true },
];

/// A matched route with its extracted `:param` values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub route: &'a RouteDescriptor,
    pub params: Vec<(&'a str, String)>,
}

impl RouteMatch<'_> {
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.iter().find(|(k, _)| *k == name).map(|(_, v)| v.as_str())
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// First route in `routes` whose pattern matches `path`. A trailing slash is ignored.
#[must_use]
pub fn match_route<'a>(routes: &'a [RouteDescriptor], path: &str) -> Option<RouteMatch<'a>> {
    routes.iter().find_map(|route| {
        let mut params = Vec::new();
        let mut pattern = segments(route.path);
        let mut actual = segments(path);
        loop {
            match (pattern.next(), actual.next()) {
                (None, None) => return Some(RouteMatch { route, params }),
                (Some(p), Some(a)) => {
                    if let Some(name) = p.strip_prefix(':') {
                        params.push((name, a.to_owned()));
                    } else if p != a {
                        return None;
                    }
                }
                _ => return None,
            }
        }
    })
}
