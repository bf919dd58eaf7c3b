pub mod fields;
pub mod page;
pub mod state;
pub mod submit;
pub mod upload;

pub use page::ListingFormPage;
pub use state::{reduce, Action, FormMode, FormState, PageState, PageStatus};
pub use submit::SubmitSettings;
pub use upload::CancelToken;
