//! Random account generation, used when the stock runs dry and
//! `stock.random_fallback` is enabled.

use crate::credential::CredentialRecord;
use rand::Rng;

const USERNAME_LEN: usize = 10;
const PASSWORD_LEN: usize = 12;

const USERNAME_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const PASSWORD_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

fn sample(rng: &mut impl Rng, charset: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| charset[rng.gen_range(0..charset.len())] as char)
        .collect()
}

/// Generate a fresh username/password pair.
pub fn generate() -> CredentialRecord {
    let mut rng = rand::thread_rng();
    let username = sample(&mut rng, USERNAME_CHARSET, USERNAME_LEN);
    let password = sample(&mut rng, PASSWORD_CHARSET, PASSWORD_LEN);
    CredentialRecord::new(username, password)
}
