/// Lossy UTF-8 decode; invalid sequences become U+FFFD, which normalization
/// later strips as non-word characters.
pub fn extract(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_bytes_do_not_fail() {
        let text = extract(b"caf\xff\xfe latte");
        assert!(text.starts_with("caf"));
        assert!(text.ends_with(" latte"));
    }
}
