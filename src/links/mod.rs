pub mod extractor;
pub mod types;
pub mod validator;

pub use extractor::{extract_links, identifier_of};
pub use types::CatalogIdentifier;
pub use validator::{DEFAULT_APPDETAILS_ENDPOINT, LinkValidator, Rejection, Validation};
