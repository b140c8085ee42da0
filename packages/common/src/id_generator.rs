use crc32fast::Hasher;

/// Stable short id derived from an arbitrary scope key using CRC32
pub fn get_scope_id(key: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ID generator for instances created within one scope
#[derive(Debug, Clone)]
pub struct IDGenerator {
    seed: String,
    count: u32,
}

impl IDGenerator {
    pub fn new(scope_key: &str) -> Self {
        Self {
            seed: get_scope_id(scope_key),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    /// Generate the next ID that `taken` does not already contain
    pub fn new_unique_id(&mut self, taken: impl Fn(&str) -> bool) -> String {
        loop {
            let id = self.new_id();
            if !taken(&id) {
                return id;
            }
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}
