//! Named analytics events shared by the dashboard surfaces.

/// A trackable product event: a display name plus the channel it reports to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogEvent {
    pub name: &'static str,
    pub channel: &'static str,
}

pub const SIGN_IN: LogEvent = LogEvent {
    name: "User Signed In",
    channel: "login",
};

pub const SIGN_OUT: LogEvent = LogEvent {
    name: "User Signed Out",
    channel: "login",
};

pub const REGISTERED: LogEvent = LogEvent {
    name: "User Registered",
    channel: "registered",
};

pub const TEAM_CREATED: LogEvent = LogEvent {
    name: "Team Created",
    channel: "team",
};

pub const DELETE_USER: LogEvent = LogEvent {
    name: "User Deleted",
    channel: "user",
};
