use sha2::{Digest, Sha256};

use crate::{
    graph::Workspace,
    persist::{PersistResult, save_workspace},
};

pub type Fingerprint = [u8; 32];

pub fn hash_bytes(bytes: &[u8]) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&result);
    out
}

/// Content hash of a workspace's saved form: its nodes, ports, defaults and
/// wiring. Dirty flags are not part of it.
pub fn fingerprint(workspace: &Workspace) -> PersistResult<Fingerprint> {
    let record = save_workspace(workspace)?;
    Ok(hash_bytes(&serde_json::to_vec(&record)?))
}

pub fn to_hex(fingerprint: &Fingerprint) -> String {
    fingerprint.iter().map(|b| format!("{:02x}", b)).collect()
}
