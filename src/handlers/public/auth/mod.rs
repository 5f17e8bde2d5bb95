// handlers/public/auth/mod.rs - Public authentication handlers

pub mod login;    // POST /auth/login - verify credentials and issue JWT
pub mod logout;   // POST /auth/logout - stateless confirmation
pub mod register; // POST /auth/register - create new account

pub use login::login_post;
pub use logout::logout_post;
pub use register::register_post;
