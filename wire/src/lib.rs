//! PostgreSQL v3 wire framer: turns frontend bytes into calls against
//! an `Engine` and engine results back into backend packets. Knows nothing
//! about sockets — `server` owns the `TcpListener` and feeds bytes through
//! `WireSession::feed_wire` exactly as §5 describes.

pub mod encode;
pub mod outcome;
pub mod session;
pub mod startup;

pub use outcome::WireOutcome;
pub use session::WireSession;
