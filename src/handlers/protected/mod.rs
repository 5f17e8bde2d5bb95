// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Routes in this tier sit behind `middleware::jwt_auth_middleware`, which
// rejects requests without a valid bearer token and injects `AuthUser`.

pub mod auth;      // GET /auth/me
pub mod learnings; // POST /learnings, PUT|DELETE /learnings/:id
pub mod upload;    // POST /upload, POST /upload/multiple
