//! CLI argument validation functions
//!
//! Value parsers for clap that reject bad input before any configuration
//! is loaded.

use std::net::IpAddr;
use std::path::PathBuf;

use crate::services::messengers::{KNOWN_MESSENGERS, MessengerRegistry};

/// Validate port number is within valid range (1-65535)
pub fn validate_port(port_str: &str) -> Result<u16, String> {
    let port: u16 = port_str.parse().map_err(|_| {
        format!("Port must be a valid number between 1 and 65535, got: '{port_str}'")
    })?;

    if port == 0 {
        return Err("Port must be between 1 and 65535. Port 0 is not allowed.".to_string());
    }

    Ok(port)
}

/// Validate that a configuration path names an existing, readable file
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{path_str}'"));
    }
    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{path_str}'"));
    }
    std::fs::File::open(&path)
        .map(|_| path)
        .map_err(|e| format!("Cannot read configuration file '{path_str}': {e}"))
}

/// Validate a bind host: an IP literal, `localhost`, or a DNS name
pub fn validate_host_address(host_str: &str) -> Result<String, String> {
    let host = host_str.trim();

    if host.is_empty() {
        return Err("Host address cannot be empty".to_string());
    }
    if host.contains(char::is_whitespace) {
        return Err("Host address cannot contain spaces".to_string());
    }
    if host.parse::<IpAddr>().is_ok() {
        return Ok(host.to_string());
    }
    // Dotted digits that failed to parse are a broken IPv4 literal, not a name.
    if host.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(format!("Invalid IPv4 address format: '{host_str}'"));
    }
    if host.len() > 253 {
        return Err("Host address is too long (maximum 253 characters)".to_string());
    }
    let valid_label = |label: &str| {
        !label.is_empty()
            && label.len() <= 63
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-')
    };
    if !host.split('.').all(valid_label) {
        return Err(format!("Invalid host name: '{host_str}'"));
    }

    Ok(host.to_string())
}

/// Validate a `--msgr` value against the messengers this build can construct
pub fn validate_messenger_name(name_str: &str) -> Result<String, String> {
    let name = name_str.trim();

    if name.is_empty() {
        return Err("Messenger name cannot be empty".to_string());
    }
    if !MessengerRegistry::is_known(name) {
        return Err(format!(
            "Unknown messenger '{name_str}', expected one of: {}",
            KNOWN_MESSENGERS.join(", ")
        ));
    }

    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_port_validation_valid_ports() {
        for port_str in ["1", "80", "443", "9000", "65535"] {
            assert!(validate_port(port_str).is_ok(), "Port {port_str} should be valid");
        }
    }

    #[test]
    fn test_port_validation_invalid_ports() {
        for port_str in ["0", "65536", "abc", "-1", ""] {
            assert!(validate_port(port_str).is_err(), "Port {port_str} should be invalid");
        }
    }

    #[test]
    fn test_host_validation_valid_hosts() {
        for host in [
            "localhost",
            "127.0.0.1",
            "0.0.0.0",
            "::1",
            "relay.example.com",
            "my-server.local",
        ] {
            assert!(validate_host_address(host).is_ok(), "Host {host} should be valid");
        }
    }

    #[test]
    fn test_host_validation_invalid_hosts() {
        let long = "x".repeat(300);
        for host in [
            "",
            "   ",
            "host with spaces",
            "999.999.999.999",
            "-bad.example.com",
            "under_score.example.com",
            long.as_str(),
        ] {
            assert!(validate_host_address(host).is_err(), "Host '{host}' should be invalid");
        }
    }

    #[test]
    fn test_config_path_must_exist() {
        assert!(validate_config_file_path("/definitely/not/here.toml").is_err());

        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        assert_eq!(validate_config_file_path(path).unwrap(), file.path());
    }

    #[test]
    fn test_config_path_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = validate_config_file_path(dir.path().to_str().unwrap()).unwrap_err();
        assert!(err.contains("not a file"));
    }

    #[test]
    fn test_messenger_name_validation() {
        assert_eq!(validate_messenger_name("ses").unwrap(), "ses");
        assert_eq!(validate_messenger_name(" twilio ").unwrap(), "twilio");
        assert_eq!(validate_messenger_name("pinpoint").unwrap(), "pinpoint");
        assert!(validate_messenger_name("sms-a").is_err());
        assert!(validate_messenger_name("").is_err());
        assert!(validate_messenger_name("Twilio").is_err());
        assert!(validate_messenger_name("ses,twilio").is_err());
    }
}
