use anyhow::Context as _;
use sha3::Digest as _;

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut h = sha3::Keccak256::new();
    h.update(data);
    let out = h.finalize();
    let mut b = [0u8; 32];
    b.copy_from_slice(&out);
    b
}

pub fn parse_hex_20(s: &str) -> anyhow::Result<[u8; 20]> {
    let raw = s.trim().strip_prefix("0x").unwrap_or(s.trim());
    let bytes = hex::decode(raw).context("hex decode")?;
    anyhow::ensure!(
        bytes.len() == 20,
        "expected 20-byte hex, got {}",
        bytes.len()
    );
    let mut out = [0u8; 20];
    out.copy_from_slice(&bytes);
    Ok(out)
}

pub fn eip55_checksum_address(addr: [u8; 20]) -> String {
    let hex_lower = hex::encode(addr);
    let hash = keccak256(hex_lower.as_bytes());
    let mut out = String::with_capacity(2 + 40);
    out.push_str("0x");
    for (i, ch) in hex_lower.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            (hash[i / 2] >> 4) & 0x0f
        } else {
            hash[i / 2] & 0x0f
        };
        if ch.is_ascii_alphabetic() && nibble >= 8 {
            out.push(ch.to_ascii_uppercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Re-renders an address string in EIP-55 checksum form so registry lookups
/// are case-insensitive over hex input.
pub fn checksum_address(s: &str) -> anyhow::Result<String> {
    let addr = parse_hex_20(s).with_context(|| format!("parse address {s:?}"))?;
    Ok(eip55_checksum_address(addr))
}
