pub mod session;

pub use session::{require_session, session_middleware, Session};
