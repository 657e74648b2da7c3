/// Domain models stored by the credential store
pub mod app;
pub mod user;

pub use app::App;
pub use user::User;
