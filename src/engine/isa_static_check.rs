//! Compile-time-adjacent guard over the mnemonic table.
//!
//! Binaries on user disks depend on the table's names and arities never
//! drifting by accident. The test below hashes the entire definition list;
//! deliberate table changes must update the pinned constant.

#[cfg(test)]
mod tests {
    const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    /// Pinned FNV-1a hash of the mnemonic table. Update only on a
    /// deliberate language change, via `print_mnemonic_table_hash`.
    const EXPECTED_TABLE_HASH: u64 = 0xd915091be2027381;

    fn fnv1a_64(mut hash: u64, bytes: &[u8]) -> u64 {
        for &byte in bytes {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }

    macro_rules! hash_mnemonics {
        (
            $(
                $(#[$doc:meta])*
                $name:ident = $text:literal => $kind:ident($count:literal)
            ),* $(,)?
        ) => {{
            let mut hash = FNV_OFFSET_BASIS;
            $(
                hash = fnv1a_64(hash, stringify!($name).as_bytes());
                hash = fnv1a_64(hash, $text.as_bytes());
                hash = fnv1a_64(hash, stringify!($kind).as_bytes());
                hash = fnv1a_64(hash, &($count as u64).to_le_bytes());
            )*
            hash
        }};
    }

    fn current_table_hash() -> u64 {
        crate::for_each_mnemonic!(hash_mnemonics)
    }

    /// Prints the current hash so a deliberate change can update the pin.
    /// Run with `cargo test print_mnemonic_table_hash -- --ignored --nocapture`.
    #[test]
    #[ignore]
    fn print_mnemonic_table_hash() {
        println!("mnemonic table hash: 0x{:016x}", current_table_hash());
    }

    #[test]
    fn mnemonic_table_unchanged() {
        assert_eq!(
            current_table_hash(),
            EXPECTED_TABLE_HASH,
            "the mnemonic table changed; existing binaries may no longer run. \
             If the change is deliberate, update EXPECTED_TABLE_HASH."
        );
    }
}
