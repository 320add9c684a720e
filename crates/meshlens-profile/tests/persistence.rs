//! Profile book persistence across store instances

use meshlens_profile::{EngineConfig, ProfileStore};
use tempfile::TempDir;

#[test]
fn test_book_survives_reload() {
    let temp_dir = TempDir::new().unwrap();
    let store = ProfileStore::new(temp_dir.path());

    let mut book = store.load();
    let first = book.active_id().to_string();
    let second = book.add_new().id.clone();

    let mut edited = book.get(&second).unwrap().clone();
    edited.network_name = "family".to_string();
    edited.peers = "tcp://198.51.100.1:11010".to_string();
    book.update(edited).unwrap();
    store.save(&book).unwrap();

    let reloaded = ProfileStore::new(temp_dir.path()).load();
    assert_eq!(reloaded, book);
    assert_eq!(reloaded.active_id(), second);
    assert_eq!(reloaded.active().network_name, "family");
    assert!(reloaded.get(&first).is_some());
}

#[test]
fn test_stale_active_id_selects_first() {
    let temp_dir = TempDir::new().unwrap();
    let store = ProfileStore::new(temp_dir.path());

    let mut book = store.load();
    let first = book.active_id().to_string();
    book.add_new();
    store.save(&book).unwrap();

    let text = std::fs::read_to_string(store.book_path()).unwrap();
    let text = text.replace(
        &format!("\"active_id\": \"{}\"", book.active_id()),
        "\"active_id\": \"no-longer-here\"",
    );
    std::fs::write(store.book_path(), text).unwrap();

    let reloaded = store.load();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.active_id(), first);
}

#[test]
fn test_active_profile_renders_engine_config() {
    let temp_dir = TempDir::new().unwrap();
    let store = ProfileStore::new(temp_dir.path());

    let mut book = store.load();
    let mut profile = book.active().clone();
    profile.dhcp = false;
    profile.virtual_ipv4 = "10.144.144.1".to_string();
    profile.enable_vpn_portal = true;
    book.update(profile).unwrap();
    store.save(&book).unwrap();

    let text = store.load().active().render_toml().unwrap();
    let config = EngineConfig::from_toml(&text).unwrap();
    assert_eq!(config.ipv4.as_deref(), Some("10.144.144.1/24"));
    assert_eq!(config.listeners.len(), 3);
    let portal = config.vpn_portal_config.unwrap();
    assert_eq!(portal.client_cidr, "10.14.14.0/24");
    assert_eq!(portal.wireguard_listen, "0.0.0.0:11011");
}
