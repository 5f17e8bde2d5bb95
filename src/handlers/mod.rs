// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer JWT, see middleware::auth)
pub mod extract;
pub mod public;    // Tier 1: /, /health, /auth/register|login|logout, GET /learnings
pub mod protected; // Tier 2: /auth/me, learning writes, uploads

pub use extract::AppJson;
