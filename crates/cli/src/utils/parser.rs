/// Parse a `KEY=VALUE` pair as given to `--env`.
pub fn parse_env_pair(arg: &str) -> Result<(String, String), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{arg}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in '{arg}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_pair() {
        assert_eq!(
            parse_env_pair("RUST_LOG=debug"),
            Ok(("RUST_LOG".to_string(), "debug".to_string()))
        );
        // Only the first '=' splits.
        assert_eq!(
            parse_env_pair("FLAGS=a=b"),
            Ok(("FLAGS".to_string(), "a=b".to_string()))
        );
        assert_eq!(
            parse_env_pair("EMPTY="),
            Ok(("EMPTY".to_string(), String::new()))
        );
    }

    #[test]
    fn test_parse_env_pair_rejects_malformed() {
        assert!(parse_env_pair("RUST_LOG").is_err());
        assert!(parse_env_pair("=debug").is_err());
    }
}
