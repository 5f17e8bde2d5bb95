// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Account creation, token acquisition, read-only learnings and service status.
// Inputs arrive without a trusted user context and are validated by the services.

pub mod auth;
pub mod learnings;
pub mod system;
