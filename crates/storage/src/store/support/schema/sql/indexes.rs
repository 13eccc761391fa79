#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE INDEX IF NOT EXISTS idx_ticket_owner_status ON ticket(uuid, status);
        CREATE INDEX IF NOT EXISTS idx_message_ticket ON message(ticket);
        CREATE INDEX IF NOT EXISTS idx_settings_uuid ON settings(uuid);
"#;
