use rand::rngs::StdRng;
use rand::SeedableRng;

use redeem_core::pool::{self, CodeStatus};
use redeem_core::qr::{self, QrStyle};
use redeem_core::signature::{self, SigningKey};

#[test]
fn test_pool_to_qr_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let pool_path = dir.path().join("pool/code_pool.csv");
    let qr_dir = dir.path().join("qrs");

    // Build and persist a small pool
    let mut rng = StdRng::seed_from_u64(2026);
    let codes = pool::build_pool(40, 40_000, &mut rng).unwrap();
    pool::write_pool(&pool_path, &codes).unwrap();
    println!("✓ Pool of {} codes written", codes.len());

    // Read it back the way the QR batch does
    let entries = pool::read_pool(&pool_path).unwrap();
    assert_eq!(entries.len(), 40);
    assert!(entries.iter().all(|e| e.status == CodeStatus::Free));
    assert!(entries.iter().all(|e| !e.code.is_easy()));
    println!("✓ Pool read back with all entries free");

    // Sign the first entry and check the tag round-trips
    let key = SigningKey::new(b"integration-test-secret-0123456789ab").unwrap();
    let entry = &entries[0];
    let sig = signature::sign_code(&key, &entry.code);
    let url = signature::verification_url("https://example.test/t", &entry.code, &sig);
    assert!(signature::verify_code(&key, &entry.code, &sig));
    assert_eq!(url, format!("https://example.test/t?p={}&s={}", entry.code, sig));
    println!("✓ Signature verified for {}", entry.code);

    // Render and save the artifact
    let img = qr::render(&url, &QrStyle::default(), None).unwrap();
    let path = qr::save_png(&img, &qr_dir, &entry.code).unwrap();
    assert!(path.is_file());
    println!("✓ QR artifact saved to {}", path.display());

    // Re-render is idempotent: same path, still readable
    let again = qr::save_png(&img, &qr_dir, &entry.code).unwrap();
    assert_eq!(path, again);
    let reloaded = image::open(&again).unwrap();
    assert_eq!(reloaded.width(), img.width());
    println!("✓ Re-render overwrote the same artifact");
}
