//! Generates the Argon2 hash for `ADMIN_PASSWORD_HASH`.
//!
//! ```bash
//! cargo run -p botboard-api --bin generate-admin-hash -- 'YourPasswordHere1'
//! ```

use botboard_shared::auth::password;

fn main() {
    let password = match std::env::args().nth(1) {
        Some(p) => p,
        None => {
            eprintln!("Usage: generate-admin-hash <password>");
            std::process::exit(1);
        }
    };

    if let Err(reason) = password::validate_password_strength(&password) {
        eprintln!("Refusing to hash a weak password: {}", reason);
        std::process::exit(1);
    }

    match password::hash_password(&password) {
        Ok(hash) => {
            println!("Generated hash:");
            println!("{}", hash);
            println!();
            println!("Add this to your .env (single quotes keep the $ signs intact):");
            println!("ADMIN_PASSWORD_HASH='{}'", hash);
        }
        Err(e) => {
            eprintln!("Failed to hash password: {}", e);
            std::process::exit(1);
        }
    }
}
