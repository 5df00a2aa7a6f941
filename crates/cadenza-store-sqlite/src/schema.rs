//! SQL schema for the Cadenza SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS accounts (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,   -- lowercased
    password_hash TEXT NOT NULL,          -- argon2 PHC string
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS profiles (
    user_id             TEXT PRIMARY KEY REFERENCES accounts(user_id),
    full_name           TEXT NOT NULL DEFAULT '',
    bio                 TEXT NOT NULL DEFAULT '',
    instrument          TEXT,
    experience_level    TEXT NOT NULL DEFAULT 'beginner',
    avatar_url          TEXT,
    xp                  INTEGER NOT NULL DEFAULT 0 CHECK (xp >= 0),
    level               INTEGER NOT NULL DEFAULT 1 CHECK (level >= 1),
    profile_color       TEXT NOT NULL,
    profile_icon        TEXT NOT NULL,
    profile_banner      TEXT,
    profile_accessories TEXT,             -- JSON
    discord_username    TEXT,
    telegram_username   TEXT,
    instagram_username  TEXT,
    youtube_channel     TEXT,
    online_status       TEXT,
    last_seen           TEXT,
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS profiles_level_idx ON profiles(level DESC, xp DESC);
CREATE INDEX IF NOT EXISTS profiles_xp_idx    ON profiles(xp DESC);

-- ── Catalog ────────────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS composers (
    composer_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    bio         TEXT,
    birth_year  INTEGER,
    death_year  INTEGER,
    nationality TEXT,
    period      TEXT,
    image_url   TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pieces (
    piece_id         TEXT PRIMARY KEY,
    title            TEXT NOT NULL,
    composer         TEXT NOT NULL,
    composer_id      TEXT REFERENCES composers(composer_id),
    instrument       TEXT NOT NULL,
    period           TEXT,
    genre            TEXT,
    difficulty       INTEGER CHECK (difficulty BETWEEN 1 AND 10),
    average_duration INTEGER,
    description      TEXT,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS pieces_composer_idx ON pieces(composer_id);

CREATE TABLE IF NOT EXISTS events (
    event_id    TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    description TEXT,
    event_date  TEXT NOT NULL,
    location    TEXT,
    url         TEXT,
    created_by  TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_events (
    user_id       TEXT NOT NULL,
    event_id      TEXT NOT NULL REFERENCES events(event_id),
    registered_at TEXT NOT NULL,
    UNIQUE (user_id, event_id)
);

-- ── Repertoire ─────────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS user_pieces (
    user_piece_id TEXT PRIMARY KEY,
    user_id       TEXT NOT NULL,
    piece_id      TEXT NOT NULL REFERENCES pieces(piece_id),
    status        TEXT NOT NULL CHECK (status IN ('current', 'wishlist', 'mastered')),
    progress      INTEGER NOT NULL DEFAULT 0 CHECK (progress BETWEEN 0 AND 100),
    notes         TEXT,
    started_at    TEXT NOT NULL,
    mastered_at   TEXT,
    updated_at    TEXT NOT NULL,
    UNIQUE (user_id, piece_id)
);

-- ── Missions ───────────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS missions (
    mission_id  TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    description TEXT NOT NULL,
    category    TEXT NOT NULL,   -- 'daily' | 'weekly' | 'monthly'
    kind        TEXT NOT NULL,   -- 'practice' | 'technique' | 'repertoire' | 'performance'
    xp_reward   INTEGER NOT NULL CHECK (xp_reward >= 0),
    deadline    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS mission_progress (
    user_id    TEXT NOT NULL,
    mission_id TEXT NOT NULL REFERENCES missions(mission_id),
    progress   INTEGER NOT NULL CHECK (progress BETWEEN 0 AND 100),
    updated_at TEXT NOT NULL,
    PRIMARY KEY (user_id, mission_id)
);

-- One completion per (user, mission); this is what stops a double claim.
CREATE TABLE IF NOT EXISTS user_missions (
    user_mission_id TEXT PRIMARY KEY,
    user_id         TEXT NOT NULL,
    mission_id      TEXT NOT NULL REFERENCES missions(mission_id),
    xp_earned       INTEGER NOT NULL,
    completed_at    TEXT NOT NULL,
    UNIQUE (user_id, mission_id)
);

-- ── Challenges & achievements ──────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS achievements (
    achievement_id TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    description    TEXT,
    category       TEXT,
    icon           TEXT,
    points         INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS challenges (
    challenge_id   TEXT PRIMARY KEY,
    title          TEXT NOT NULL,
    description    TEXT,
    goal           INTEGER NOT NULL CHECK (goal > 0),
    goal_type      TEXT NOT NULL,
    duration       TEXT,
    start_date     TEXT,
    end_date       TEXT,
    achievement_id TEXT REFERENCES achievements(achievement_id)
);

CREATE TABLE IF NOT EXISTS user_challenges (
    user_challenge_id TEXT PRIMARY KEY,
    user_id           TEXT NOT NULL,
    challenge_id      TEXT NOT NULL REFERENCES challenges(challenge_id),
    progress          INTEGER NOT NULL DEFAULT 0,
    completed         INTEGER NOT NULL DEFAULT 0,
    completed_at      TEXT,
    joined_at         TEXT NOT NULL,
    UNIQUE (user_id, challenge_id)
);

CREATE TABLE IF NOT EXISTS user_achievements (
    user_id        TEXT NOT NULL,
    achievement_id TEXT NOT NULL REFERENCES achievements(achievement_id),
    earned_at      TEXT NOT NULL,
    UNIQUE (user_id, achievement_id)
);

-- ── Social ─────────────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS user_connections (
    connection_id     TEXT PRIMARY KEY,
    user_id           TEXT NOT NULL,   -- requester
    connected_user_id TEXT NOT NULL,   -- receiver
    status            TEXT NOT NULL CHECK (status IN ('pending', 'accepted', 'rejected')),
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL,
    CHECK (user_id != connected_user_id)
);

-- One row per unordered pair, whichever side asked first.
CREATE UNIQUE INDEX IF NOT EXISTS user_connections_pair_idx
    ON user_connections (min(user_id, connected_user_id), max(user_id, connected_user_id));

-- ── Practice ───────────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS practice_sessions (
    session_id TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL,
    piece_id   TEXT REFERENCES pieces(piece_id),
    duration   INTEGER NOT NULL CHECK (duration > 0),
    rating     INTEGER CHECK (rating BETWEEN 1 AND 5),
    notes      TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS practice_sessions_user_idx
    ON practice_sessions(user_id, created_at DESC);

CREATE TABLE IF NOT EXISTS practice_streaks (
    user_id            TEXT PRIMARY KEY,
    current_streak     INTEGER NOT NULL DEFAULT 0,
    longest_streak     INTEGER NOT NULL DEFAULT 0,
    last_practice_date TEXT,   -- YYYY-MM-DD
    updated_at         TEXT NOT NULL
);

-- ── Settings ───────────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS user_settings (
    user_id               TEXT PRIMARY KEY,
    theme                 TEXT NOT NULL DEFAULT 'system',
    notifications_enabled INTEGER NOT NULL DEFAULT 1,
    api_key               TEXT,
    created_at            TEXT NOT NULL,
    updated_at            TEXT NOT NULL
);

-- ── Store metadata ─────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS store_meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

PRAGMA user_version = 1;
";
