//! Splitting flat keys into `(container, item)` addresses.
//!
//! The last `/` in a key separates the container name from the item name:
//!
//! - `"users/alice"` → container `"users"`, item `"alice"`
//! - `"a/b/c"` → container `"a/b"`, item `"c"`
//! - `"logs/"` → container `"logs"`, item `""`
//! - `"alice"` or `"/alice"` → container `"default"`, item is the whole key

/// Container used when a key carries no container part.
pub const DEFAULT_CONTAINER: &str = "default";

/// Container/item separator.
pub const SEPARATOR: char = '/';

/// A key resolved into its container and item parts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Address<'a> {
    pub container: &'a str,
    pub item: &'a str,
}

/// Parse a key into an [`Address`].
///
/// A separator at position 0 has no container in front of it, so the key
/// falls back to the default container unchanged.
///
/// # Examples
///
/// ```
/// use twinkv_store::address::parse_address;
///
/// let addr = parse_address("users/alice");
/// assert_eq!((addr.container, addr.item), ("users", "alice"));
///
/// let addr = parse_address("alice");
/// assert_eq!((addr.container, addr.item), ("default", "alice"));
/// ```
pub fn parse_address(key: &str) -> Address<'_> {
    match key.rfind(SEPARATOR) {
        Some(i) if i > 0 => Address {
            container: &key[..i],
            item: &key[i + SEPARATOR.len_utf8()..],
        },
        _ => Address {
            container: DEFAULT_CONTAINER,
            item: key,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn splits_on_last_separator() {
        let addr = parse_address("a/b/c");
        assert_eq!(addr.container, "a/b");
        assert_eq!(addr.item, "c");
    }

    #[test]
    fn trailing_separator_yields_empty_item() {
        let addr = parse_address("logs/");
        assert_eq!(addr.container, "logs");
        assert_eq!(addr.item, "");
    }

    #[test]
    fn no_separator_uses_default_container() {
        let addr = parse_address("alice");
        assert_eq!(addr.container, DEFAULT_CONTAINER);
        assert_eq!(addr.item, "alice");
    }

    #[test]
    fn leading_separator_keeps_whole_key() {
        let addr = parse_address("/alice");
        assert_eq!(addr.container, DEFAULT_CONTAINER);
        assert_eq!(addr.item, "/alice");
    }

    #[test]
    fn empty_key() {
        let addr = parse_address("");
        assert_eq!(addr.container, DEFAULT_CONTAINER);
        assert_eq!(addr.item, "");
    }

    proptest! {
        #[test]
        fn single_separator_splits_exactly(
            container in "[a-z0-9._-]{1,16}",
            item in "[a-z0-9._-]{0,16}",
        ) {
            let key = format!("{container}/{item}");
            let addr = parse_address(&key);
            prop_assert_eq!(addr.container, container.as_str());
            prop_assert_eq!(addr.item, item.as_str());
        }

        #[test]
        fn separator_free_keys_land_in_default(key in "[^/]{0,32}") {
            let addr = parse_address(&key);
            prop_assert_eq!(addr.container, DEFAULT_CONTAINER);
            prop_assert_eq!(addr.item, key.as_str());
        }
    }
}
