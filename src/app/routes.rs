use std::fmt;

/// Every page the application can show, keyed by URL path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Explore,
    Offers,
    Category { category: String },
    Profile,
    SignIn,
    SignUp,
    ForgotPassword,
    CreateListing,
    EditListing { listing_id: String },
    Listing { category: String, listing_id: String },
    Contact { landlord_id: String },
}

impl Route {
    /// Map a URL path to a route. Trailing slashes are ignored.
    pub fn parse(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path
            .split('?')
            .next()
            .unwrap_or_default()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        let route = match segments.as_slice() {
            [] => Route::Explore,
            ["offers"] => Route::Offers,
            ["category", category] => Route::Category {
                category: category.to_string(),
            },
            ["category", category, listing_id] => Route::Listing {
                category: category.to_string(),
                listing_id: listing_id.to_string(),
            },
            ["profile"] => Route::Profile,
            ["sign-in"] => Route::SignIn,
            ["sign-up"] => Route::SignUp,
            ["forgot-password"] => Route::ForgotPassword,
            ["create-listing"] => Route::CreateListing,
            ["edit-listing", listing_id] => Route::EditListing {
                listing_id: listing_id.to_string(),
            },
            ["contact", landlord_id] => Route::Contact {
                landlord_id: landlord_id.to_string(),
            },
            _ => return None,
        };

        Some(route)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Explore => "/".to_string(),
            Route::Offers => "/offers".to_string(),
            Route::Category { category } => format!("/category/{category}"),
            Route::Profile => "/profile".to_string(),
            Route::SignIn => "/sign-in".to_string(),
            Route::SignUp => "/sign-up".to_string(),
            Route::ForgotPassword => "/forgot-password".to_string(),
            Route::CreateListing => "/create-listing".to_string(),
            Route::EditListing { listing_id } => format!("/edit-listing/{listing_id}"),
            Route::Listing {
                category,
                listing_id,
            } => format!("/category/{category}/{listing_id}"),
            Route::Contact { landlord_id } => format!("/contact/{landlord_id}"),
        }
    }

    /// Pages that need a signed-in user before they render
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Route::Profile | Route::CreateListing | Route::EditListing { .. }
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_route_in_the_table() {
        let paths = [
            "/",
            "/offers",
            "/category/rent",
            "/profile",
            "/sign-in",
            "/sign-up",
            "/forgot-password",
            "/create-listing",
            "/edit-listing/abc123",
            "/category/sale/abc123",
            "/contact/landlord-7",
        ];

        for path in paths {
            let route = Route::parse(path).unwrap_or_else(|| panic!("{path} did not parse"));
            assert_eq!(route.path(), path);
        }
    }

    #[test]
    fn parse_ignores_trailing_slash_and_query() {
        assert_eq!(Route::parse("/offers/"), Some(Route::Offers));
        assert_eq!(
            Route::parse("/contact/l1?listingName=Loft"),
            Some(Route::Contact {
                landlord_id: "l1".into()
            })
        );
    }

    #[test]
    fn unknown_paths_do_not_parse() {
        assert_eq!(Route::parse("/edit-listing"), None);
        assert_eq!(Route::parse("/admin"), None);
        assert_eq!(Route::parse("/category/a/b/c"), None);
    }

    #[test]
    fn only_account_pages_are_protected() {
        assert!(Route::CreateListing.is_protected());
        assert!(Route::EditListing {
            listing_id: "x".into()
        }
        .is_protected());
        assert!(Route::Profile.is_protected());
        assert!(!Route::Explore.is_protected());
        assert!(!Route::SignIn.is_protected());
    }
}
