use netguard_domain::config::Config;

#[test]
fn parses_full_document() {
    let yaml = r#"
app:
  update_interval_hours: 12
  log_level: debug
network:
  queue_num: 3
  queue_size: 128
blocking:
  sources:
    - name: steven_black
      url: https://example.com/hosts
      format: hosts
    - name: threat_feed
      url: https://example.com/feed.csv
      format: csv
      target_column: url
  blacklist:
    - evil.com
  whitelist:
    - intranet.corp
ai:
  enable_adware_model: false
  enable_malware_scanner: true
database:
  path: /tmp/netguard-test.db
"#;

    let config = Config::from_yaml(yaml).unwrap();
    config.validate().unwrap();

    assert_eq!(config.app.update_interval_hours, 12);
    assert_eq!(config.app.log_level, "debug");
    assert_eq!(config.network.queue_num, 3);
    assert_eq!(config.network.queue_size, 128);
    assert_eq!(config.blocking.sources.len(), 2);
    assert_eq!(config.blocking.sources[1].target_column.as_deref(), Some("url"));
    assert_eq!(config.blocking.blacklist, vec!["evil.com"]);
    assert_eq!(config.blocking.whitelist, vec!["intranet.corp"]);
    assert!(!config.ai.enable_adware_model);
    assert_eq!(config.database.path, "/tmp/netguard-test.db");
}

#[test]
fn empty_document_gets_defaults() {
    let config = Config::from_yaml("{}").unwrap();
    config.validate().unwrap();

    assert_eq!(config.app.update_interval_hours, 24);
    assert_eq!(config.app.log_level, "info");
    assert_eq!(config.network.queue_num, 0);
    assert_eq!(config.network.queue_size, 255);
    assert!(config.blocking.sources.is_empty());
    assert!(config.ai.enable_malware_scanner);
    assert_eq!(config.database.path, "./data/blocklist.db");
}

#[test]
fn unknown_format_is_kept_verbatim() {
    // Dispatch falls back to the hosts parser; the config itself stays valid.
    let yaml = r#"
blocking:
  sources:
    - name: odd_feed
      url: https://example.com/list
      format: dnsmasq
"#;
    let config = Config::from_yaml(yaml).unwrap();
    config.validate().unwrap();
    assert_eq!(config.blocking.sources[0].format, "dnsmasq");
}

#[test]
fn csv_without_target_column_is_rejected() {
    let yaml = r#"
blocking:
  sources:
    - name: feed
      url: https://example.com/feed.csv
      format: csv
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn zero_update_interval_is_rejected() {
    let config = Config::from_yaml("app:\n  update_interval_hours: 0\n").unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn bad_log_level_is_rejected() {
    let config = Config::from_yaml("app:\n  log_level: verbose\n").unwrap();
    assert!(config.validate().is_err());
}
