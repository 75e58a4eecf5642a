//! Windows Installer "packed" product codes.
//!
//! The installer stores product codes under `Installer\Products` with their
//! hex digits reordered: the first three groups are reversed and the last
//! two groups have each digit pair swapped. The reordering is its own
//! inverse, so encoding and decoding share one permutation and only differ
//! in how the input is split and the output is joined.

use crate::error::GuidError;

const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];
const HEX_DIGITS: usize = 32;

/// `8-4-4-4-12` (braces optional) to the 32-digit packed form.
pub fn encode_to_compressed(standard: &str) -> Result<String, GuidError> {
    let trimmed = standard.trim_start_matches('{').trim_end_matches('}');
    let groups: Vec<&str> = trimmed.split('-').collect();

    let well_formed = groups.len() == GROUPS.len()
        && groups
            .iter()
            .zip(GROUPS)
            .all(|(group, len)| group.len() == len && is_hex(group));
    if !well_formed {
        return Err(GuidError::Malformed(standard.to_string()));
    }

    Ok(reorder(&groups))
}

/// 32-digit packed form to dashed `8-4-4-4-12`, without braces.
pub fn decode_from_compressed(compressed: &str) -> Result<String, GuidError> {
    if compressed.len() != HEX_DIGITS || !is_hex(compressed) {
        return Err(GuidError::Malformed(compressed.to_string()));
    }

    let mut groups = Vec::with_capacity(GROUPS.len());
    let mut start = 0;
    for len in GROUPS {
        groups.push(&compressed[start..start + len]);
        start += len;
    }

    let packed = reorder(&groups);
    let mut dashed = String::with_capacity(HEX_DIGITS + 4);
    let mut start = 0;
    for (i, len) in GROUPS.iter().enumerate() {
        if i > 0 {
            dashed.push('-');
        }
        dashed.push_str(&packed[start..start + len]);
        start += len;
    }
    Ok(dashed)
}

/// Wraps a dashed identifier in braces, the form `msiexec` and the
/// Uninstall key names use.
pub fn braced(dashed: &str) -> String {
    format!("{{{}}}", dashed.trim_start_matches('{').trim_end_matches('}'))
}

fn reorder(groups: &[&str]) -> String {
    let mut out = String::with_capacity(HEX_DIGITS);
    for group in &groups[..3] {
        out.extend(group.chars().rev());
    }
    for group in &groups[3..] {
        let bytes = group.as_bytes();
        for pair in bytes.chunks(2) {
            out.push(pair[1] as char);
            out.push(pair[0] as char);
        }
    }
    out
}

fn is_hex(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    const OFFICE: &str = "90160000-008C-0000-0000-0000000FF1CE";
    const OFFICE_PACKED: &str = "00006109C80000000000000000F01FEC";

    #[test]
    fn encodes_known_product_code() {
        assert_eq!(encode_to_compressed(OFFICE).unwrap(), OFFICE_PACKED);
        assert_eq!(
            encode_to_compressed(&format!("{{{OFFICE}}}")).unwrap(),
            OFFICE_PACKED
        );
    }

    #[test]
    fn decodes_known_product_code() {
        assert_eq!(decode_from_compressed(OFFICE_PACKED).unwrap(), OFFICE);
    }

    #[test]
    fn round_trips_both_directions() {
        let samples = [
            "12345678-9ABC-DEF0-1234-56789ABCDEF0",
            "00000000-0000-0000-0000-000000000000",
            "a1b2c3d4-e5f6-0718-293a-4b5c6d7e8f90",
        ];
        for standard in samples {
            let packed = encode_to_compressed(standard).unwrap();
            assert_eq!(packed.len(), 32);
            assert_eq!(decode_from_compressed(&packed).unwrap(), standard);
            assert_eq!(encode_to_compressed(&decode_from_compressed(&packed).unwrap()).unwrap(), packed);
        }
    }

    #[test]
    fn reverses_first_groups_and_swaps_pairs_in_last_groups() {
        let packed = encode_to_compressed("01234567-89AB-CDEF-0123-456789ABCDEF").unwrap();
        assert_eq!(packed, "76543210BA98FEDC1032547698BADCFE");
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(encode_to_compressed("not-a-guid").is_err());
        assert!(encode_to_compressed("12345678-9ABC-DEF0-1234-56789ABCDEFG").is_err());
        assert!(encode_to_compressed("12345678-9ABC-DEF0-1234").is_err());
        assert!(decode_from_compressed("1234").is_err());
        assert!(decode_from_compressed("ZZ006109C80000000000000000F01FEC").is_err());
    }

    #[test]
    fn braces_dashed_form() {
        assert_eq!(braced(OFFICE), format!("{{{OFFICE}}}"));
        assert_eq!(braced(&format!("{{{OFFICE}}}")), format!("{{{OFFICE}}}"));
    }
}
