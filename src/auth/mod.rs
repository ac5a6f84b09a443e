pub mod gate;
pub mod password;
pub mod token;

pub use gate::{require_admin, AdminUser, CurrentUser};
pub use password::CredentialStore;
pub use token::TokenService;
