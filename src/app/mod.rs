pub mod navbar;
pub mod notify;
pub mod routes;
pub mod session;

pub use navbar::Navbar;
pub use notify::{Navigator, Toast, ToastLevel, Toasts};
pub use routes::Route;
pub use session::SessionGuard;
