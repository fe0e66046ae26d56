use sha2::{Digest, Sha256};

/// Leaf size of the Glacier SHA-256 tree hash.
const CHUNK_SIZE: usize = 1024 * 1024;

/// Compute the hex-encoded SHA-256 tree hash Glacier requires on uploads.
///
/// The payload is hashed in 1 MiB leaves; adjacent digests are concatenated
/// and re-hashed level by level, an odd trailing digest is promoted as-is.
pub fn tree_hash(data: &[u8]) -> String {
    let mut level: Vec<[u8; 32]> = if data.is_empty() {
        vec![Sha256::digest(data).into()]
    } else {
        data.chunks(CHUNK_SIZE)
            .map(|chunk| Sha256::digest(chunk).into())
            .collect()
    };

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => {
                    let mut hasher = Sha256::new();
                    hasher.update(left);
                    hasher.update(right);
                    hasher.finalize().into()
                }
                [single] => *single,
                _ => unreachable!("chunks(2) yields one or two items"),
            })
            .collect();
    }

    hex::encode(level[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sha(parts: &[&[u8]]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for p in parts {
            hasher.update(p);
        }
        hasher.finalize().into()
    }

    #[test]
    fn small_payload_is_plain_sha256() {
        let data = b"hello glacier";
        assert_eq!(tree_hash(data), hex::encode(sha(&[&data[..]])));
    }

    #[test]
    fn empty_payload_hashes_to_empty_digest() {
        assert_eq!(
            tree_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn two_leaves_are_combined() {
        let data = vec![7u8; CHUNK_SIZE + 10];
        let h1 = sha(&[&data[..CHUNK_SIZE]]);
        let h2 = sha(&[&data[CHUNK_SIZE..]]);
        assert_eq!(tree_hash(&data), hex::encode(sha(&[&h1[..], &h2[..]])));
    }

    #[test]
    fn odd_leaf_is_promoted() {
        let data = vec![1u8; 2 * CHUNK_SIZE + 1];
        let h1 = sha(&[&data[..CHUNK_SIZE]]);
        let h2 = sha(&[&data[CHUNK_SIZE..2 * CHUNK_SIZE]]);
        let h3 = sha(&[&data[2 * CHUNK_SIZE..]]);
        let left = sha(&[&h1[..], &h2[..]]);
        assert_eq!(tree_hash(&data), hex::encode(sha(&[&left[..], &h3[..]])));
    }
}
