pub mod serde_hex_bytes;

#[cfg(test)]
pub fn generate_random_ascii_string(len: usize) -> String {
    use rand::{distributions::Alphanumeric, Rng};

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
