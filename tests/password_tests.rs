//! 密码哈希集成测试
//!
//! 检查编码格式与参数随哈希携带的行为

use datatask::auth::password::{HashError, HashOptions, PasswordHasher, SALT_LEN};

fn hasher(memory_kib: u32, parallelism: u32) -> PasswordHasher {
    PasswordHasher::new(HashOptions {
        time_cost: 1,
        memory_kib,
        parallelism,
        key_len: 32,
    })
    .expect("valid params")
}

#[test]
fn test_encoded_hash_layout() {
    let encoded = hasher(1024, 2).hash("pw123").unwrap();
    let fields: Vec<&str> = encoded.split('$').collect();

    assert_eq!(fields.len(), 6);
    assert_eq!(fields[0], "");
    assert_eq!(fields[1], "argon2id");
    assert_eq!(fields[2], "v=19");
    assert_eq!(fields[3], "m=1024,t=1,p=2");

    // 无填充 base64：32 字节 -> 43 字符
    assert_eq!(fields[4].len(), (SALT_LEN * 4).div_ceil(3));
    assert_eq!(fields[5].len(), 43);
}

#[test]
fn test_hash_verifies_after_parameter_change() {
    let stored = hasher(1024, 1).hash("correct horse").unwrap();
    let current = hasher(4096, 2);

    assert!(current.verify("correct horse", &stored).unwrap());
    assert!(!current.verify("battery staple", &stored).unwrap());
}

#[test]
fn test_rejects_foreign_or_truncated_hashes() {
    let h = hasher(1024, 1);
    let encoded = h.hash("pw123").unwrap();

    let truncated = &encoded[..encoded.rfind('$').unwrap()];
    assert!(matches!(h.verify("pw123", truncated), Err(HashError::InvalidHashFormat)));

    let bcrypt = "$2b$12$R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW";
    assert!(matches!(h.verify("pw123", bcrypt), Err(HashError::InvalidHashFormat)));
}

#[test]
fn test_rejects_invalid_params() {
    assert!(PasswordHasher::new(HashOptions {
        time_cost: 0,
        memory_kib: 1024,
        parallelism: 1,
        key_len: 32,
    })
    .is_err());
}
