use rand::distributions::{Alphanumeric, DistString};

pub fn random_id(prefix: &str) -> String {
    let mut rng = rand::thread_rng();

    format!("{}_{}", prefix, Alphanumeric.sample_string(&mut rng, 16).to_lowercase())
}
