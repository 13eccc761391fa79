#![forbid(unsafe_code)]

// Baseline tables as the first plugin release created them. `ticket.location`
// is added by the first migration, never here.
pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS ticket (
          id INTEGER,
          uuid TEXT,
          status TEXT,
          picker TEXT
        );

        CREATE TABLE IF NOT EXISTS message (
          ticket INTEGER,
          reason TEXT,
          data TEXT,
          sender TEXT,
          date TEXT
        );

        CREATE TABLE IF NOT EXISTS notification (
          uuid TEXT,
          message TEXT,
          replacements TEXT
        );

        CREATE TABLE IF NOT EXISTS settings (
          uuid TEXT,
          announcements TEXT
        );
"#;
