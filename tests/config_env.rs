//! Configuration loading against the real process environment
//!
//! These tests mutate environment variables and must not run in parallel.

mod common;

use common::temp_config_file;
use jarvis::cli::Cli;
use jarvis::config::Config;
use serial_test::serial;

const ENV_KEYS: &[&str] = &[
    "GROQ_API_KEY",
    "GROQ_API_KEY_2",
    "GROQ_API_KEY_3",
    "TAVILY_API_KEY",
    "ASSISTANT_NAME",
    "JARVIS_PORT",
];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_env_overrides_file_values() {
    clear_env();
    let (_dir, path) = temp_config_file(
        "server:\n  port: 9000\nassistant:\n  name: Friday\nretrieval:\n  k: 4\n",
    );
    std::env::set_var("GROQ_API_KEY", "gsk-first");
    std::env::set_var("GROQ_API_KEY_2", "gsk-second");
    std::env::set_var("ASSISTANT_NAME", "Edith");
    std::env::set_var("JARVIS_PORT", "9100");

    let config = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap();
    clear_env();

    assert_eq!(config.llm.api_keys, vec!["gsk-first", "gsk-second"]);
    assert_eq!(config.assistant.name, "Edith");
    assert_eq!(config.server.port, 9100);
    assert_eq!(config.retrieval.k, 4);
    assert!(config.search.api_key.is_none());
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_key_discovery_stops_at_first_gap() {
    clear_env();
    std::env::set_var("GROQ_API_KEY", "gsk-first");
    std::env::set_var("GROQ_API_KEY_3", "gsk-third");

    let config = Config::load("does/not/exist.yaml", &Cli::default()).unwrap();
    clear_env();

    assert_eq!(config.llm.api_keys, vec!["gsk-first"]);
}

#[test]
#[serial]
fn test_malformed_file_is_an_error() {
    clear_env();
    let (_dir, path) = temp_config_file("server: [not, a, mapping]\n");
    assert!(Config::load(path.to_str().unwrap(), &Cli::default()).is_err());
}
