use super::notify::Navigator;
use super::routes::Route;

/// One entry of the bottom navigation bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    pub label: &'static str,
    pub route: Route,
}

/// An entry as rendered for a given location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub path: String,
    pub active: bool,
}

pub struct Navbar {
    entries: Vec<NavEntry>,
    navigator: Navigator,
}

impl Navbar {
    pub fn new(navigator: Navigator) -> Self {
        let entries = vec![
            NavEntry {
                label: "Explore",
                route: Route::Explore,
            },
            NavEntry {
                label: "Offers",
                route: Route::Offers,
            },
            NavEntry {
                label: "Profile",
                route: Route::Profile,
            },
        ];

        Self { entries, navigator }
    }

    /// Exact string comparison, `/category/rent` does not light up `/`
    pub fn path_matches_route(current_path: &str, route: &Route) -> bool {
        route.path() == current_path
    }

    pub fn items(&self, current_path: &str) -> Vec<NavItem> {
        self.entries
            .iter()
            .map(|entry| NavItem {
                label: entry.label,
                path: entry.route.path(),
                active: Self::path_matches_route(current_path, &entry.route),
            })
            .collect()
    }

    /// Navigate to the entry with this label. Returns false for unknown labels.
    pub fn select(&self, label: &str) -> bool {
        match self.entries.iter().find(|entry| entry.label == label) {
            Some(entry) => {
                self.navigator.navigate(entry.route.clone());
                true
            }
            None => false,
        }
    }

    /// Plain-text rendering, active entry in brackets
    pub fn render(&self, current_path: &str) -> String {
        self.items(current_path)
            .iter()
            .map(|item| {
                if item.active {
                    format!("[{}]", item.label)
                } else {
                    item.label.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    }
}
