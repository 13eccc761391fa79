#![forbid(unsafe_code)]

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UserSettings {
    pub announcements: bool,
}

impl UserSettings {
    pub fn new(announcements: bool) -> Self {
        Self { announcements }
    }
}
