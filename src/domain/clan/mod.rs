//! Clan module - persistent groups that host recurring quiz sessions.

mod aggregate;

pub use aggregate::{
    Clan, ClanLeaveOutcome, ClanMember, ClanRole, DEFAULT_MAX_MEMBERS, INVITE_CODE_LEN,
};
