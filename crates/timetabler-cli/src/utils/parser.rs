use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE.")]
    MissingSeparator(String),
    #[error("Empty key in --set value: '{0}'")]
    EmptyKey(String),
}

/// Splits a `KEY=VALUE` override at its first `=`, trimming both halves.
pub fn parse_key_value(input: &str) -> Result<(&str, &str), ParseError> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| ParseError::MissingSeparator(input.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ParseError::EmptyKey(input.to_string()));
    }
    Ok((key, value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_at_first_separator() {
        assert_eq!(
            parse_key_value("search.time-limit-secs = 30"),
            Ok(("search.time-limit-secs", "30"))
        );
        assert_eq!(parse_key_value("a=b=c"), Ok(("a", "b=c")));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(
            parse_key_value("search.time-limit-secs"),
            Err(ParseError::MissingSeparator(_))
        ));
        assert!(matches!(parse_key_value(" =3"), Err(ParseError::EmptyKey(_))));
    }
}
