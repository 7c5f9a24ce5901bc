pub mod auth;
pub mod content;
pub mod inquiry;
pub mod notification;
pub mod rewrite;
pub mod storage;
pub mod theme;
pub mod user;

pub use auth::AuthService;
pub use content::ContentService;
pub use inquiry::InquiryService;
pub use notification::EmailNotifier;
pub use rewrite::RewriteService;
pub use storage::ObjectStorage;
pub use theme::ThemeService;
pub use user::UserService;
