//! SQL schema for the contact-moment SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Insertion order is rowid order.
-- previous_id / next_id are written only by the link maintainer; the UNIQUE
-- constraints back the one-predecessor / one-successor rule.
CREATE TABLE IF NOT EXISTS contactmomenten (
    id                 TEXT PRIMARY KEY,
    bronorganisatie    TEXT NOT NULL,
    klant              TEXT NOT NULL DEFAULT '',
    interactiedatum    TEXT NOT NULL,   -- ISO 8601 UTC
    kanaal             TEXT NOT NULL,
    tekst              TEXT NOT NULL,
    voorkeurskanaal    TEXT NOT NULL DEFAULT '',
    voorkeurstaal      TEXT NOT NULL DEFAULT '',
    initiatiefnemer    TEXT NOT NULL,   -- 'gemeente' | 'klant'
    medewerker         TEXT NOT NULL DEFAULT '',
    onderwerp_links    TEXT NOT NULL DEFAULT '[]',
    previous_id        TEXT UNIQUE REFERENCES contactmomenten(id),
    next_id            TEXT UNIQUE REFERENCES contactmomenten(id),
    CHECK (previous_id IS NULL OR previous_id != id),
    CHECK (next_id     IS NULL OR next_id     != id)
);

-- At most one identification per contact moment, deleted with its owner.
CREATE TABLE IF NOT EXISTS medewerker_identificaties (
    contactmoment_id       TEXT PRIMARY KEY
                           REFERENCES contactmomenten(id) ON DELETE CASCADE,
    identificatie          TEXT NOT NULL,
    achternaam             TEXT NOT NULL,
    voorletters            TEXT NOT NULL,
    voorvoegsel_achternaam TEXT
);

CREATE INDEX IF NOT EXISTS contactmomenten_taal_idx  ON contactmomenten(voorkeurstaal);
CREATE INDEX IF NOT EXISTS contactmomenten_datum_idx ON contactmomenten(interactiedatum);

PRAGMA user_version = 1;
";
