/// Authentication and authorization for crewtask
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`session`]: Opaque session tokens backed by redis (the only channel
///   through which a caller's identity is established)
/// - [`middleware`]: Request-level auth context and cookie extraction
/// - [`authorization`]: The membership authority — every role comparison in
///   the system happens in this one module
///
/// # Security Notes
///
/// - Passwords are hashed with Argon2id; verification is constant-time.
/// - Session tokens are 32 bytes from the OS RNG, hex-encoded, and opaque:
///   nothing about the user is recoverable from the token itself.
/// - Sessions expire a fixed TTL after creation, independent of activity.

pub mod authorization;
pub mod middleware;
pub mod password;
pub mod session;
