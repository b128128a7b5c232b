use std::env;
use std::process;

use bcrypt::hash;

const COST: u32 = 10;

fn main() {
    let Some(password) = env::args().nth(1) else {
        eprintln!("Usage: hash_password <password>");
        process::exit(1);
    };

    match hash(&password, COST) {
        Ok(hashed) => {
            println!("Add this to your .env file:");
            println!("ADMIN_PASSWORD_HASH={}", hashed);
        }
        Err(e) => {
            eprintln!("Failed to hash password: {}", e);
            process::exit(1);
        }
    }
}
