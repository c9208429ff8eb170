//! Cache keys for webservice lookups

use sha2::{Digest, Sha256};

/// Feed one length-prefixed field, so no field boundary can be faked by its contents
fn field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

/// Key for the result of `operation` called with `params`.
///
/// Parameter order does not matter. The result is a 64-char hex digest.
pub fn cache_key(operation: &str, params: &[(&str, &str)]) -> String {
    let mut pairs = params.to_vec();
    pairs.sort_unstable();

    let mut hasher = Sha256::new();
    field(&mut hasher, operation.as_bytes());
    hasher.update((pairs.len() as u64).to_le_bytes());
    for (name, value) in pairs {
        field(&mut hasher, name.as_bytes());
        field(&mut hasher, value.as_bytes());
    }

    format!("{:x}", hasher.finalize())
}
