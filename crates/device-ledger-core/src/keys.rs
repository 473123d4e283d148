//! Composite storage keys.
//!
//! A key is a sequence of segments joined by `/`. Inside a segment, `%` and
//! `/` are percent-escaped, so two different tuples can never produce the
//! same key (`("a-b", "c")` and `("a", "b-c")` stay distinct) and the
//! segments can always be recovered from a key.
//!
//! | Record              | Key                        |
//! |---------------------|----------------------------|
//! | Permission          | `perm/<device>/<user>`     |
//! | Device              | `device/<device>`          |
//! | FirmwareRelease     | `release/<type>/<version>` |
//! | DeviceFirmwareState | `installed/<device>`       |

use std::borrow::Cow;

use crate::types::{DeviceId, DeviceType, FirmwareVersion, Principal};

const SEPARATOR: char = '/';

/// Record tags, the first segment of every key.
pub mod tags {
    pub const PERMISSION: &str = "perm";
    pub const DEVICE: &str = "device";
    pub const RELEASE: &str = "release";
    pub const INSTALLED: &str = "installed";
}

/// Escape a single segment.
pub fn escape_segment(segment: &str) -> Cow<'_, str> {
    if !segment.contains(['%', SEPARATOR]) {
        return Cow::Borrowed(segment);
    }
    let mut out = String::with_capacity(segment.len() + 4);
    for c in segment.chars() {
        match c {
            '%' => out.push_str("%25"),
            SEPARATOR => out.push_str("%2F"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Reverse [`escape_segment`]. Returns `None` on a malformed escape.
pub fn unescape_segment(segment: &str) -> Option<String> {
    let mut out = String::with_capacity(segment.len());
    let mut rest = segment;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let code = rest.get(pos + 1..pos + 3)?;
        match code {
            "25" => out.push('%'),
            "2F" => out.push(SEPARATOR),
            _ => return None,
        }
        rest = &rest[pos + 3..];
    }
    out.push_str(rest);
    Some(out)
}

/// Join escaped segments into a key.
pub fn compose(segments: &[&str]) -> String {
    let mut key = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            key.push(SEPARATOR);
        }
        key.push_str(&escape_segment(segment));
    }
    key
}

/// Split a key back into its unescaped segments.
pub fn split(key: &str) -> Option<Vec<String>> {
    key.split(SEPARATOR).map(unescape_segment).collect()
}

/// Key of the permission triple for `(device, user)`.
pub fn permission(device: &DeviceId, user: &Principal) -> String {
    compose(&[tags::PERMISSION, device.as_str(), user.as_str()])
}

/// Prefix shared by every permission key of `device`.
pub fn permission_prefix(device: &DeviceId) -> String {
    let mut prefix = compose(&[tags::PERMISSION, device.as_str()]);
    prefix.push(SEPARATOR);
    prefix
}

/// Key of a device record.
pub fn device(device: &DeviceId) -> String {
    compose(&[tags::DEVICE, device.as_str()])
}

/// Prefix shared by every device record key.
pub fn device_prefix() -> String {
    let mut prefix = tags::DEVICE.to_owned();
    prefix.push(SEPARATOR);
    prefix
}

/// Key of a firmware release.
pub fn release(device_type: &DeviceType, version: &FirmwareVersion) -> String {
    compose(&[tags::RELEASE, device_type.as_str(), version.as_str()])
}

/// Prefix shared by every release of `device_type`.
pub fn release_prefix(device_type: &DeviceType) -> String {
    let mut prefix = compose(&[tags::RELEASE, device_type.as_str()]);
    prefix.push(SEPARATOR);
    prefix
}

/// Key of a device's installed firmware pointer.
pub fn installed(device: &DeviceId) -> String {
    compose(&[tags::INSTALLED, device.as_str()])
}

/// The last unescaped segment of a key (the user of a permission key, the
/// version of a release key, the device of a device key).
pub fn last_segment(key: &str) -> Option<String> {
    split(key)?.pop()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_dash_concatenation_does_not_collide() {
        let a = release(&DeviceType::from("a-b"), &FirmwareVersion::from("c"));
        let b = release(&DeviceType::from("a"), &FirmwareVersion::from("b-c"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_separator_in_segment_is_escaped() {
        let key = permission(&DeviceId::from("dev/1"), &Principal::from("50%"));
        assert_eq!(key, "perm/dev%2F1/50%25");
        assert_eq!(
            split(&key).unwrap(),
            vec!["perm".to_string(), "dev/1".to_string(), "50%".to_string()]
        );
    }

    #[test]
    fn test_prefix_matches_only_own_device() {
        let prefix = permission_prefix(&DeviceId::from("dev"));
        assert!(permission(&DeviceId::from("dev"), &Principal::from("u")).starts_with(&prefix));
        assert!(!permission(&DeviceId::from("dev2"), &Principal::from("u")).starts_with(&prefix));
        assert!(!permission(&DeviceId::from("dev/x"), &Principal::from("u")).starts_with(&prefix));
    }

    #[test]
    fn test_malformed_escape_rejected() {
        assert_eq!(unescape_segment("bad%zz"), None);
        assert_eq!(unescape_segment("trailing%2"), None);
    }

    proptest! {
        #[test]
        fn prop_split_inverts_compose(a in ".{0,16}", b in ".{0,16}") {
            let key = compose(&[tags::RELEASE, &a, &b]);
            prop_assert_eq!(split(&key).unwrap(), vec![tags::RELEASE.to_string(), a, b]);
        }

        #[test]
        fn prop_distinct_tuples_distinct_keys(
            a in "[a-z/%-]{0,6}", b in "[a-z/%-]{0,6}",
            c in "[a-z/%-]{0,6}", d in "[a-z/%-]{0,6}",
        ) {
            let k1 = permission(&DeviceId::from(a.as_str()), &Principal::from(b.as_str()));
            let k2 = permission(&DeviceId::from(c.as_str()), &Principal::from(d.as_str()));
            prop_assert_eq!(k1 == k2, a == c && b == d);
        }
    }
}
