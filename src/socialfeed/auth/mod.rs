//! Authentication: password hashing, bearer tokens, cookie sessions and the
//! admin basic-auth session cache.

pub mod cookie;
pub mod middleware;
pub mod password;
pub mod session;
pub mod state;
pub mod token;

pub use middleware::{AdminPrincipal, SessionUser, require_admin, require_bearer, require_session_cookie};
pub use password::PasswordHasher;
pub use session::{AdminSessions, SessionStatus};
pub use state::{AuthConfig, AuthState};
pub use token::{Claims, TokenError, TokenIssuer};
