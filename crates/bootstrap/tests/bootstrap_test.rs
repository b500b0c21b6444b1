//! End-to-end tests for the bootstrap engine.
//!
//! Each test drives a full bootstrap run against a temporary root
//! directory, with a fake embedded platform binary injected so binary
//! distribution is observable. Identity generation and parameter
//! signing use the production collaborators.

use netforge::{
    BootstrapOptions, Bootstrapper, DefaultArchiveHasher, DefaultIdentityGenerator,
    JsonConfigParser, NodeConf, NotaryConf, PlatformBinarySource, APPS_DIR_NAME,
    IDENTITY_FILE_PREFIX, NETWORK_PARAMS_FILE_NAME, NODE_BINARY_FILE_NAME, NODE_CONF_FILE_NAME,
    PEER_IDENTITIES_DIR_NAME,
};
use netforge_crypto::TrustRoot;
use netforge_types::{NetworkParameters, SignedNetworkParameters, SignedNodeIdentity};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FAKE_EMBEDDED_BINARY: &[u8] = b"fake embedded netforge-node build";

struct FakeBinarySource(Vec<u8>);

impl PlatformBinarySource for FakeBinarySource {
    fn bytes(&self) -> netforge::Result<Vec<u8>> {
        Ok(self.0.clone())
    }
}

/// A fresh engine per call models one invocation of the tool.
fn bootstrapper() -> Bootstrapper {
    Bootstrapper::with_collaborators(
        Box::new(JsonConfigParser),
        Box::new(DefaultIdentityGenerator::new()),
        Box::new(FakeBinarySource(FAKE_EMBEDDED_BINARY.to_vec())),
        Box::new(DefaultArchiveHasher),
        TrustRoot::dev(),
    )
}

fn bootstrap(root: &Path) -> netforge::Result<()> {
    bootstrapper()
        .bootstrap(root, &BootstrapOptions::default())
        .map(|_| ())
}

fn bootstrap_no_copy(root: &Path) -> netforge::Result<()> {
    let options = BootstrapOptions {
        copy_apps: false,
        ..Default::default()
    };
    bootstrapper().bootstrap(root, &options).map(|_| ())
}

fn plain_conf(legal_name: &str) -> NodeConf {
    NodeConf {
        legal_name: legal_name.to_string(),
        notary: None,
    }
}

fn notary_conf(legal_name: &str) -> NodeConf {
    NodeConf {
        legal_name: legal_name.to_string(),
        notary: Some(NotaryConf { validating: true }),
    }
}

fn write_loose_conf(root: &Path, node_name: &str, conf: &NodeConf) -> (PathBuf, Vec<u8>) {
    let path = root.join(format!("{node_name}_node.conf"));
    let bytes = serde_json::to_vec_pretty(conf).unwrap();
    std::fs::write(&path, &bytes).unwrap();
    (path, bytes)
}

fn write_node_dir(root: &Path, node_name: &str, conf: &NodeConf) -> PathBuf {
    let dir = root.join(node_name);
    std::fs::create_dir(&dir).unwrap();
    std::fs::write(
        dir.join(NODE_CONF_FILE_NAME),
        serde_json::to_vec_pretty(conf).unwrap(),
    )
    .unwrap();
    dir
}

fn read_params(node_dir: &Path) -> NetworkParameters {
    let signed =
        SignedNetworkParameters::load(&node_dir.join(NETWORK_PARAMS_FILE_NAME)).unwrap();
    TrustRoot::dev().verify(&signed).unwrap()
}

fn own_identity(node_dir: &Path) -> SignedNodeIdentity {
    let entry = std::fs::read_dir(node_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .find(|e| {
            e.file_name()
                .to_string_lossy()
                .starts_with(IDENTITY_FILE_PREFIX)
        })
        .expect("node should have an identity file");
    SignedNodeIdentity::from_slice(&std::fs::read(entry.path()).unwrap()).unwrap()
}

/// Assert the shared invariants of a bootstrapped network and return
/// the (everywhere-equal) parameters.
fn assert_bootstrapped(root: &Path, binary: &[u8], node_names: &[&str]) -> NetworkParameters {
    let params = read_params(&root.join(node_names[0]));
    let identities: Vec<SignedNodeIdentity> = node_names
        .iter()
        .map(|name| own_identity(&root.join(name)))
        .collect();

    for name in node_names {
        let node_dir = root.join(name);
        assert_eq!(
            std::fs::read(node_dir.join(NODE_BINARY_FILE_NAME)).unwrap(),
            binary,
            "platform binary must be byte-identical in {name}"
        );
        assert_eq!(read_params(&node_dir), params);

        // Every peer identity, including the node's own, is present.
        let peers_dir = node_dir.join(PEER_IDENTITIES_DIR_NAME);
        let peer_count = std::fs::read_dir(&peers_dir).unwrap().count();
        assert_eq!(peer_count, node_names.len());
        for identity in &identities {
            let found = std::fs::read_dir(&peers_dir)
                .unwrap()
                .filter_map(|e| e.ok())
                .any(|e| {
                    SignedNodeIdentity::from_slice(&std::fs::read(e.path()).unwrap())
                        .map(|parsed| parsed == *identity)
                        .unwrap_or(false)
                });
            assert!(
                found,
                "{name} should hold the identity of {}",
                identity.identity.legal_name
            );
        }
    }
    params
}

#[test]
fn test_empty_dir_fails_with_no_nodes() {
    let root = TempDir::new().unwrap();
    let err = bootstrap(root.path()).unwrap_err();
    assert_eq!(err.to_string(), "No nodes found");
}

#[test]
fn test_single_node_conf_file() {
    let root = TempDir::new().unwrap();
    let (conf_file, _) = write_loose_conf(root.path(), "bob", &plain_conf("Bob Ltd"));

    bootstrap(root.path()).unwrap();

    assert!(!conf_file.exists());
    assert!(root.path().join("bob").join(NODE_CONF_FILE_NAME).is_file());

    let params = assert_bootstrapped(root.path(), FAKE_EMBEDDED_BINARY, &["bob"]);
    assert_eq!(params.epoch, 1);
    assert!(params.notaries.is_empty());
    assert!(params.whitelist.is_empty());
}

#[test]
fn test_loose_binary_takes_precedence_over_embedded() {
    let root = TempDir::new().unwrap();
    write_loose_conf(root.path(), "bob", &plain_conf("Bob Ltd"));
    std::fs::write(root.path().join(NODE_BINARY_FILE_NAME), b"root build").unwrap();

    bootstrap(root.path()).unwrap();

    assert_bootstrapped(root.path(), b"root build", &["bob"]);
}

#[test]
fn test_embedded_binary_flag_overrides_loose_binary() {
    let root = TempDir::new().unwrap();
    write_loose_conf(root.path(), "bob", &plain_conf("Bob Ltd"));
    std::fs::write(root.path().join(NODE_BINARY_FILE_NAME), b"root build").unwrap();

    let options = BootstrapOptions {
        prefer_embedded_binary: true,
        ..Default::default()
    };
    bootstrapper().bootstrap(root.path(), &options).unwrap();

    assert_bootstrapped(root.path(), FAKE_EMBEDDED_BINARY, &["bob"]);
}

#[test]
fn test_existing_node_directory() {
    let root = TempDir::new().unwrap();
    write_node_dir(root.path(), "bob", &plain_conf("Bob Ltd"));

    bootstrap(root.path()).unwrap();

    assert_bootstrapped(root.path(), FAKE_EMBEDDED_BINARY, &["bob"]);
}

#[test]
fn test_stale_node_binary_is_replaced() {
    let root = TempDir::new().unwrap();
    let dir = write_node_dir(root.path(), "bob", &plain_conf("Bob Ltd"));
    std::fs::write(dir.join(NODE_BINARY_FILE_NAME), b"stale build").unwrap();

    bootstrap(root.path()).unwrap();

    assert_bootstrapped(root.path(), FAKE_EMBEDDED_BINARY, &["bob"]);
}

#[test]
fn test_node_directory_without_conf_fails_untouched() {
    let root = TempDir::new().unwrap();
    let dir = root.path().join("alice");
    std::fs::create_dir(&dir).unwrap();
    std::fs::write(dir.join(NODE_BINARY_FILE_NAME), b"preexisting").unwrap();

    let err = bootstrap(root.path()).unwrap_err();
    assert_eq!(err.to_string(), "Missing node.conf in node directory alice");
    assert_eq!(
        std::fs::read(dir.join(NODE_BINARY_FILE_NAME)).unwrap(),
        b"preexisting"
    );
}

#[test]
fn test_duplicate_legal_names_fail_before_any_write() {
    let root = TempDir::new().unwrap();
    let (_, conf1) = write_loose_conf(root.path(), "node1", &plain_conf("Alice Corp"));
    let (_, conf2) = write_loose_conf(root.path(), "node2", &plain_conf("Alice Corp"));

    let err = bootstrap(root.path()).unwrap_err();
    assert!(err
        .to_string()
        .contains("Nodes must have unique legal names"));

    // Conf files were relocated (the one permitted pre-validation
    // mutation) with content preserved byte for byte, and nothing else
    // was created.
    for (dir_name, original) in [("node1", &conf1), ("node2", &conf2)] {
        let node_dir = root.path().join(dir_name);
        assert_eq!(
            std::fs::read(node_dir.join(NODE_CONF_FILE_NAME)).unwrap(),
            *original
        );
        let extra: Vec<_> = std::fs::read_dir(&node_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != NODE_CONF_FILE_NAME)
            .collect();
        assert!(extra.is_empty(), "no other files may exist in {dir_name}");
        assert!(!node_dir.join(NETWORK_PARAMS_FILE_NAME).exists());
    }
}

#[test]
fn test_conf_file_and_existing_directory_mix() {
    let root = TempDir::new().unwrap();
    write_loose_conf(root.path(), "alice", &plain_conf("Alice Corp"));
    write_node_dir(root.path(), "bob", &plain_conf("Bob Ltd"));

    bootstrap(root.path()).unwrap();

    assert_bootstrapped(root.path(), FAKE_EMBEDDED_BINARY, &["alice", "bob"]);
}

#[test]
fn test_notary_appears_once_with_its_identity() {
    let root = TempDir::new().unwrap();
    write_loose_conf(root.path(), "alice", &plain_conf("Alice Corp"));
    write_loose_conf(root.path(), "notary", &notary_conf("Notary Service"));

    bootstrap(root.path()).unwrap();

    let params = assert_bootstrapped(root.path(), FAKE_EMBEDDED_BINARY, &["alice", "notary"]);
    assert_eq!(params.notaries.len(), 1);
    let notary = &params.notaries[0];
    assert!(notary.validating);
    assert_eq!(notary.identity.legal_name, "Notary Service");

    let generated = own_identity(&root.path().join("notary"));
    assert_eq!(notary.identity, generated.identity);
}

#[test]
fn test_app_archive_is_whitelisted_and_copied() {
    let root = TempDir::new().unwrap();
    write_loose_conf(root.path(), "alice", &plain_conf("Alice Corp"));
    let app_bytes = b"compiled contract module";
    std::fs::write(root.path().join("sample.token.wasm"), app_bytes).unwrap();

    bootstrap(root.path()).unwrap();

    let params = assert_bootstrapped(root.path(), FAKE_EMBEDDED_BINARY, &["alice"]);
    let hashes = &params.whitelist["sample.token"];
    assert_eq!(hashes, &vec![netforge_types::Hash::compute(app_bytes)]);

    assert_eq!(
        std::fs::read(
            root.path()
                .join("alice")
                .join(APPS_DIR_NAME)
                .join("sample.token.wasm")
        )
        .unwrap(),
        app_bytes
    );
}

#[test]
fn test_no_copy_still_whitelists() {
    let root = TempDir::new().unwrap();
    write_loose_conf(root.path(), "alice", &plain_conf("Alice Corp"));
    let app_bytes = b"compiled contract module";
    std::fs::write(root.path().join("sample.token.wasm"), app_bytes).unwrap();

    bootstrap_no_copy(root.path()).unwrap();

    let params = read_params(&root.path().join("alice"));
    assert_eq!(
        params.whitelist["sample.token"],
        vec![netforge_types::Hash::compute(app_bytes)]
    );
    assert!(!root.path().join("alice").join(APPS_DIR_NAME).exists());
}

#[test]
fn test_rebootstrap_unchanged_network_is_byte_identical() {
    let root = TempDir::new().unwrap();
    write_loose_conf(root.path(), "alice", &plain_conf("Alice Corp"));
    write_loose_conf(root.path(), "notary", &notary_conf("Notary Service"));

    bootstrap(root.path()).unwrap();
    let params_path = root.path().join("alice").join(NETWORK_PARAMS_FILE_NAME);
    let first = std::fs::read(&params_path).unwrap();

    bootstrap(root.path()).unwrap();
    let second = std::fs::read(&params_path).unwrap();

    assert_eq!(first, second);
    assert_eq!(read_params(&root.path().join("alice")).epoch, 1);
}

#[test]
fn test_adding_notary_bumps_epoch_and_distributes_identity() {
    let root = TempDir::new().unwrap();
    write_loose_conf(root.path(), "alice", &plain_conf("Alice Corp"));
    bootstrap(root.path()).unwrap();
    assert_eq!(read_params(&root.path().join("alice")).epoch, 1);

    write_loose_conf(root.path(), "notary", &notary_conf("Notary Service"));
    bootstrap(root.path()).unwrap();

    let params = assert_bootstrapped(root.path(), FAKE_EMBEDDED_BINARY, &["alice", "notary"]);
    assert_eq!(params.epoch, 2);
    assert_eq!(params.notaries.len(), 1);

    // Alice now also holds the notary's identity file.
    let notary_identity = own_identity(&root.path().join("notary"));
    let alice_peers = root.path().join("alice").join(PEER_IDENTITIES_DIR_NAME);
    let held = std::fs::read_dir(&alice_peers)
        .unwrap()
        .filter_map(|e| e.ok())
        .any(|e| {
            SignedNodeIdentity::from_slice(&std::fs::read(e.path()).unwrap())
                .map(|parsed| parsed == notary_identity)
                .unwrap_or(false)
        });
    assert!(held);
}

#[test]
fn test_identity_is_reused_across_runs() {
    let root = TempDir::new().unwrap();
    write_loose_conf(root.path(), "alice", &plain_conf("Alice Corp"));

    bootstrap(root.path()).unwrap();
    let first = own_identity(&root.path().join("alice"));

    bootstrap(root.path()).unwrap();
    let second = own_identity(&root.path().join("alice"));

    assert_eq!(first, second);
}

#[test]
fn test_whitelist_only_grows_across_runs() {
    let root = TempDir::new().unwrap();
    write_loose_conf(root.path(), "alice", &plain_conf("Alice Corp"));
    let archive = root.path().join("sample.token.wasm");
    std::fs::write(&archive, b"version one").unwrap();

    bootstrap(root.path()).unwrap();
    assert_eq!(read_params(&root.path().join("alice")).epoch, 1);

    // A new build of the same contract gains a second hash; the first
    // stays whitelisted.
    std::fs::write(&archive, b"version two").unwrap();
    bootstrap(root.path()).unwrap();

    let params = read_params(&root.path().join("alice"));
    assert_eq!(params.epoch, 2);
    assert_eq!(
        params.whitelist["sample.token"],
        vec![
            netforge_types::Hash::compute(b"version one"),
            netforge_types::Hash::compute(b"version two"),
        ]
    );
}

#[test]
fn test_tampered_prior_parameters_abort() {
    let root = TempDir::new().unwrap();
    write_loose_conf(root.path(), "alice", &plain_conf("Alice Corp"));
    bootstrap(root.path()).unwrap();

    // Corrupt the signed record in place.
    let params_path = root.path().join("alice").join(NETWORK_PARAMS_FILE_NAME);
    let mut signed = SignedNetworkParameters::load(&params_path).unwrap();
    signed.parameters.epoch += 1;
    signed.save(&params_path).unwrap();

    let err = bootstrap(root.path()).unwrap_err();
    assert!(matches!(
        err,
        netforge::BootstrapError::SignatureVerification { .. }
    ));
}
