pub mod auth;
pub mod content;
pub mod defaults;
pub mod inquiry;
pub mod theme;
pub mod user;

pub use auth::*;
pub use content::*;
pub use inquiry::*;
pub use theme::*;
pub use user::*;
