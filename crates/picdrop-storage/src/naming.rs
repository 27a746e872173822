//! Stored filename generation.

use uuid::Uuid;

/// Longest extension carried over from a client filename.
const MAX_EXTENSION_LEN: usize = 16;

/// Extract the extension (without the dot) from an untrusted client filename.
///
/// Only the final path component is considered. Dotfiles such as `.bashrc` and names
/// ending in `.` have no extension. Extensions that are not 1 to 16 ASCII alphanumeric
/// characters are dropped so they can never leak separators or URL metacharacters into
/// the stored name. Case is preserved.
pub fn derive_extension(original_filename: &str) -> Option<&str> {
    let base = original_filename
        .rsplit(&['/', '\\'][..])
        .next()
        .unwrap_or(original_filename);

    let (stem, extension) = base.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() || extension.len() > MAX_EXTENSION_LEN {
        return None;
    }
    if !extension.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    Some(extension)
}

/// Unique token for a stored file.
///
/// UUIDv7 values are time-ordered and monotonic within the process, with a random tail,
/// so two uploads landing in the same clock tick still get distinct tokens.
pub fn generate_token() -> String {
    Uuid::now_v7().simple().to_string()
}

/// Stored filename for an upload: `<token>` or `<token>.<ext>`.
pub fn generate_filename(original_filename: &str) -> String {
    let token = generate_token();
    match derive_extension(original_filename) {
        Some(extension) => format!("{}.{}", token, extension),
        None => token,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn extension_from_simple_name() {
        assert_eq!(derive_extension("photo.jpg"), Some("jpg"));
        assert_eq!(derive_extension("archive.tar.gz"), Some("gz"));
        assert_eq!(derive_extension("IMG_0001.JPEG"), Some("JPEG"));
    }

    #[test]
    fn extension_ignores_directories() {
        assert_eq!(derive_extension("C:\\Users\\me\\cat.png"), Some("png"));
        assert_eq!(derive_extension("../../etc/passwd"), None);
        assert_eq!(derive_extension("dir.with.dots/noext"), None);
    }

    #[test]
    fn no_extension_cases() {
        assert_eq!(derive_extension("README"), None);
        assert_eq!(derive_extension(".bashrc"), None);
        assert_eq!(derive_extension("trailing."), None);
        assert_eq!(derive_extension(""), None);
    }

    #[test]
    fn unsafe_extensions_are_dropped() {
        assert_eq!(derive_extension("evil.j%2Fpg"), None);
        assert_eq!(derive_extension("space.p ng"), None);
        assert_eq!(derive_extension("unicode.jpé"), None);
        assert_eq!(derive_extension("long.abcdefghijklmnopq"), None);
    }

    #[test]
    fn filename_keeps_extension() {
        let name = generate_filename("photo.jpg");
        assert!(name.ends_with(".jpg"));
        assert_eq!(name.len(), 32 + ".jpg".len());
        assert!(name[..32].bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn filename_without_extension_is_bare_token() {
        let name = generate_filename("Makefile");
        assert_eq!(name.len(), 32);
        assert!(!name.contains('.'));
    }

    #[test]
    fn tokens_are_unique_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| (0..500).map(|_| generate_token()).collect::<Vec<_>>()))
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for token in handle.join().unwrap() {
                assert!(seen.insert(token), "duplicate token generated");
            }
        }
        assert_eq!(seen.len(), 4000);
    }

    #[test]
    fn tokens_sort_by_creation_order() {
        let first = generate_token();
        let second = generate_token();
        assert!(first < second);
    }
}
