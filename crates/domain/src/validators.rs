use crate::errors::DomainError;

/// Normalize a domain name into its canonical stored form: lowercase ASCII,
/// no surrounding whitespace, no trailing dot, no scheme, no empty labels.
pub fn normalize_domain(input: &str) -> Result<String, DomainError> {
    let trimmed = input.trim().trim_end_matches('.');

    if trimmed.is_empty() {
        return Err(DomainError::InvalidDomainName(input.to_string()));
    }
    if trimmed.len() > 253 {
        return Err(DomainError::InvalidDomainName(input.to_string()));
    }
    if !trimmed.is_ascii() || trimmed.contains(|c: char| c.is_ascii_whitespace()) {
        return Err(DomainError::InvalidDomainName(input.to_string()));
    }
    if trimmed.contains("://") {
        return Err(DomainError::InvalidDomainName(input.to_string()));
    }
    if trimmed.split('.').any(|label| label.is_empty()) {
        return Err(DomainError::InvalidDomainName(input.to_string()));
    }

    Ok(trimmed.to_ascii_lowercase())
}

pub fn validate_source_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("source name cannot be empty".to_string());
    }
    if name.len() > 200 {
        return Err("source name cannot exceed 200 characters".to_string());
    }
    Ok(())
}

pub fn validate_url(url: &str) -> Result<(), String> {
    if url.len() > 2048 {
        return Err("URL cannot exceed 2048 characters".to_string());
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err("URL must start with http:// or https://".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_trailing_dot() {
        assert_eq!(normalize_domain("ADS.Example.COM.").unwrap(), "ads.example.com");
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        assert!(normalize_domain("").is_err());
        assert!(normalize_domain("   ").is_err());
        assert!(normalize_domain("a b.com").is_err());
    }

    #[test]
    fn rejects_empty_labels_and_schemes() {
        assert!(normalize_domain("ads..example.com").is_err());
        assert!(normalize_domain("https://ads.example.com").is_err());
    }

    #[test]
    fn rejects_non_ascii() {
        assert!(normalize_domain("münchen.de").is_err());
    }
}
