//! Wallet lifecycle: create, seal, unlock, rotate the password, attest.

use super::rsa_wallet;
use sok_crypto::{
    derive_address, sign_message, verify_message_text, Address, KeyKind, KeyVault, Keypair,
    SealedKey, VaultError,
};

#[test]
fn test_created_wallet_unlocks_to_same_identity() {
    let vault = KeyVault::new();
    let (keypair, sealed) = vault.create_wallet("correct horse").unwrap();
    assert_eq!(keypair.kind(), KeyKind::Rsa);

    let unlocked = vault.unlock(&sealed, "correct horse").unwrap();
    assert_eq!(unlocked.address().unwrap(), keypair.address().unwrap());
    assert!(Address::is_well_formed(unlocked.address().unwrap().as_str()));
}

#[test]
fn test_wrong_password_and_tampering_look_the_same() {
    let vault = KeyVault::new();
    let sealed = vault
        .seal(&rsa_wallet().export_private_text().unwrap(), "pw-1")
        .unwrap();

    assert_eq!(
        vault.unlock(&sealed, "pw-2").unwrap_err(),
        VaultError::WrongPasswordOrCorrupt
    );

    let mut bytes = sealed.into_bytes();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    let flipped = vault.unlock(&SealedKey::from_bytes(bytes), "pw-1");
    assert_eq!(flipped.unwrap_err(), VaultError::WrongPasswordOrCorrupt);
    let empty = vault.unlock(&SealedKey::from_bytes(Vec::new()), "pw-1");
    assert_eq!(empty.unwrap_err(), VaultError::WrongPasswordOrCorrupt);
}

#[test]
fn test_password_rotation_invalidates_old_password() {
    let vault = KeyVault::new();
    let text = rsa_wallet().export_private_text().unwrap();
    let old = vault.seal(&text, "old").unwrap();

    let opened = vault.open(&old, "old").unwrap();
    let new = vault.reseal(&opened, "new").unwrap();

    assert_ne!(old.salt(), new.salt());
    assert!(vault.open(&new, "old").is_err());
    assert_eq!(*vault.open(&new, "new").unwrap(), *text);
}

#[test]
fn test_imported_wallet_keeps_its_address() {
    let vault = KeyVault::new();
    let original = Keypair::generate_kind(KeyKind::P256).unwrap();
    let text = original.export_private_text().unwrap();

    let (imported, sealed) = vault.import_wallet(&text, "pw").unwrap();
    assert_eq!(imported.address().unwrap(), original.address().unwrap());
    assert_eq!(
        vault.unlock(&sealed, "pw").unwrap().address().unwrap(),
        original.address().unwrap()
    );

    assert!(vault.import_wallet("not a key", "pw").is_err());
}

#[test]
fn test_address_derives_from_exported_public_text() {
    for keypair in [
        rsa_wallet().clone(),
        Keypair::generate_kind(KeyKind::Secp256k1).unwrap(),
    ] {
        let public_text = keypair.export_public_text().unwrap();
        assert_eq!(derive_address(&public_text), keypair.address().unwrap());
    }
}

#[test]
fn test_attestation_verifies_only_for_signer_and_message() {
    let vault = KeyVault::new();
    let (_, sealed) = vault.create_wallet("pw").unwrap();
    let signer = vault.unlock(&sealed, "pw").unwrap();
    let public_text = signer.export_public_text().unwrap();

    let signature = sign_message(signer.private_key(), "heartbeat 42").unwrap();
    assert!(verify_message_text(&public_text, "heartbeat 42", &signature));
    assert!(!verify_message_text(&public_text, "heartbeat 43", &signature));

    let other = rsa_wallet().export_public_text().unwrap();
    assert!(!verify_message_text(&other, "heartbeat 42", &signature));
}
