/// Middleware modules for the API server
///
/// - `security`: Response security headers

pub mod security;
