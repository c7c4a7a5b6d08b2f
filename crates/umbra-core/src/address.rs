//! Address display helpers

use alloy_primitives::Address;

/// EIP-55 checksum form of an address
pub fn to_checksum(address: &Address) -> String {
    address.to_checksum(None)
}

/// Shortened display form, e.g. `0x1234...abcd`
pub fn format_address(address: &Address) -> String {
    let full = to_checksum(address);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_checksum() {
        let addr = address!("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed");
        assert_eq!(to_checksum(&addr), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
    }

    #[test]
    fn test_format_address() {
        let addr = address!("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed");
        assert_eq!(format_address(&addr), "0x5aAe...eAed");
    }
}
