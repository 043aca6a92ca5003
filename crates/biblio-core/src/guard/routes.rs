//! Route table for the library front end.

/// Suffix appended to every page title
const APP_TITLE: &str = "Library Management System";

/// Title used when a route declares none
const DEFAULT_PAGE_TITLE: &str = "Library";

/// Static gating metadata declared per route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteRequirement {
    pub requires_auth: bool,
    /// Only meaningful together with `requires_auth`
    pub requires_admin: bool,
    pub guest_only: bool,
}

impl RouteRequirement {
    pub const PUBLIC: Self = Self {
        requires_auth: false,
        requires_admin: false,
        guest_only: false,
    };
    pub const AUTHENTICATED: Self = Self {
        requires_auth: true,
        requires_admin: false,
        guest_only: false,
    };
    pub const ADMIN: Self = Self {
        requires_auth: true,
        requires_admin: true,
        guest_only: false,
    };
    pub const GUEST: Self = Self {
        requires_auth: false,
        requires_admin: false,
        guest_only: true,
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Path pattern; `:name` segments match any single segment
    pub pattern: &'static str,
    pub name: &'static str,
    pub title: Option<&'static str>,
    pub requirement: RouteRequirement,
}

impl Route {
    pub const fn new(
        pattern: &'static str,
        name: &'static str,
        title: &'static str,
        requirement: RouteRequirement,
    ) -> Self {
        Self {
            pattern,
            name,
            title: Some(title),
            requirement,
        }
    }

    fn is_static(&self) -> bool {
        !self.pattern.contains(':')
    }

    fn matches(&self, path: &str) -> bool {
        let mut pattern = segments(self.pattern);
        let mut path = segments(path);
        loop {
            match (pattern.next(), path.next()) {
                (None, None) => return true,
                (Some(p), Some(s)) if p.starts_with(':') || p == s => continue,
                _ => return false,
            }
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Strip the query string and fragment from a navigation target.
fn path_only(target: &str) -> &str {
    let end = target.find(['?', '#']).unwrap_or(target.len());
    &target[..end]
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Find the route for a navigation target.
    ///
    /// Literal patterns take precedence over parameterized ones, so
    /// `/books/create` is not mistaken for `/books/:id`.
    pub fn resolve(&self, target: &str) -> Option<&Route> {
        let path = path_only(target);
        self.routes
            .iter()
            .filter(|r| r.is_static())
            .find(|r| r.matches(path))
            .or_else(|| self.routes.iter().find(|r| r.matches(path)))
    }

    pub fn by_name(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name == name)
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        use RouteRequirement as R;

        Self::new(vec![
            Route::new("/", "Home", "Home", R::PUBLIC),
            Route::new("/login", "Login", "Log In", R::GUEST),
            Route::new("/register", "Register", "Sign Up", R::GUEST),
            Route::new("/profile", "Profile", "My Profile", R::AUTHENTICATED),
            Route::new("/books", "BookList", "Book Catalog", R::PUBLIC),
            Route::new("/books/create", "BookCreate", "Add a Book", R::ADMIN),
            Route::new("/books/:id", "BookDetail", "Book Details", R::PUBLIC),
            Route::new("/books/:id/edit", "BookEdit", "Edit a Book", R::ADMIN),
            Route::new("/loans/active", "LoanActive", "My Active Loans", R::AUTHENTICATED),
            Route::new("/loans/history", "LoanHistory", "Loan History", R::AUTHENTICATED),
            Route::new("/admin/users", "AdminUsers", "Manage Users", R::ADMIN),
            Route::new("/admin/loans", "AdminLoans", "Manage Loans", R::ADMIN),
        ])
    }
}

/// Page title for a route: `"<title> | Library Management System"`.
pub fn document_title(route: Option<&Route>) -> String {
    let title = route.and_then(|r| r.title).unwrap_or(DEFAULT_PAGE_TITLE);
    format!("{} | {}", title, APP_TITLE)
}
