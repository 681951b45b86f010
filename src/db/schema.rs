//! Database schema and migrations for roleguard.

/// Database migrations.
///
/// Each migration is a SQL script applied in order. The `schema_version`
/// table records which ones have run.
pub const MIGRATIONS: &[&str] = &[
    // v1: users table
    r#"
CREATE TABLE users (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    username        TEXT NOT NULL,
    password_hash   TEXT NOT NULL,           -- Argon2id PHC string
    role            TEXT NOT NULL CHECK (role IN ('admin', 'manager', 'user')),
    created_at      TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Username uniqueness is enforced here, not by the registration pre-check
CREATE UNIQUE INDEX idx_users_username ON users(username);
CREATE INDEX idx_users_role ON users(role);
"#,
    // v2: keep updated_at current
    r#"
CREATE TRIGGER trg_users_updated_at
AFTER UPDATE ON users
FOR EACH ROW
BEGIN
    UPDATE users SET updated_at = datetime('now') WHERE id = OLD.id;
END;
"#,
];
