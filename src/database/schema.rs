//! Idempotent DDL applied by `DatabaseManager::migrate`.

pub const STATEMENTS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS "accounts" (
        "id" BIGSERIAL PRIMARY KEY,
        "username" TEXT NOT NULL UNIQUE,
        "email" TEXT NOT NULL UNIQUE,
        "password_hash" TEXT NOT NULL,
        "roles" TEXT NOT NULL DEFAULT 'ROLE_USER',
        "enabled" BOOLEAN NOT NULL DEFAULT TRUE,
        "created_at" TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS "learnings" (
        "id" BIGSERIAL PRIMARY KEY,
        "title" TEXT,
        "description" TEXT,
        "category" TEXT,
        "date" DATE,
        "tags" TEXT,
        "attachments" JSONB,
        "custom_properties" TEXT
    )"#,
];
