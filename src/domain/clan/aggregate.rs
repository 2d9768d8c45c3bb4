//! Clan aggregate - a persistent study group.
//!
//! # Invariants
//!
//! - exactly one member holds `Owner`, and `owner_id` names them
//! - `members.len() <= max_members`
//! - name is 3-50 characters

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ClanId, DomainError, ErrorCode, ShareCode, Timestamp, UserId};

pub const INVITE_CODE_LEN: usize = 8;
pub const DEFAULT_MAX_MEMBERS: u32 = 50;
pub const MIN_NAME_LENGTH: usize = 3;
pub const MAX_NAME_LENGTH: usize = 50;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClanRole {
    Member,
    Admin,
    Owner,
}

str_enum!(ClanRole {
    Member => "member",
    Admin => "admin",
    Owner => "owner",
});

impl ClanRole {
    /// Owners and admins run sessions and manage members.
    pub fn can_moderate(&self) -> bool {
        matches!(self, ClanRole::Admin | ClanRole::Owner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClanMember {
    pub user_id: UserId,
    pub display_name: String,
    pub role: ClanRole,
    pub joined_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClanLeaveOutcome {
    Left,
    /// The sole member left; the clan should be deleted.
    Disbanded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clan {
    id: ClanId,
    name: String,
    description: Option<String>,
    owner_id: UserId,
    invite_code: ShareCode,
    max_members: u32,
    members: Vec<ClanMember>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Clan {
    pub fn create(
        owner_id: UserId,
        owner_name: impl Into<String>,
        name: &str,
        description: Option<String>,
    ) -> Result<Self, DomainError> {
        let name = Self::validate_name(name)?;
        let description = match description.map(|d| d.trim().to_string()) {
            Some(d) if d.chars().count() > MAX_DESCRIPTION_LENGTH => {
                return Err(DomainError::validation(
                    "description",
                    format!("Description cannot exceed {} characters", MAX_DESCRIPTION_LENGTH),
                ))
            }
            Some(d) if d.is_empty() => None,
            other => other,
        };

        let now = Timestamp::now();
        Ok(Self {
            id: ClanId::new(),
            name,
            description,
            owner_id: owner_id.clone(),
            invite_code: ShareCode::generate(INVITE_CODE_LEN),
            max_members: DEFAULT_MAX_MEMBERS,
            members: vec![ClanMember {
                user_id: owner_id,
                display_name: owner_name.into(),
                role: ClanRole::Owner,
                joined_at: now,
            }],
            created_at: now,
            updated_at: now,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: ClanId,
        name: String,
        description: Option<String>,
        owner_id: UserId,
        invite_code: ShareCode,
        max_members: u32,
        members: Vec<ClanMember>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            name,
            description,
            owner_id,
            invite_code,
            max_members,
            members,
            created_at,
            updated_at,
        }
    }

    fn validate_name(name: &str) -> Result<String, DomainError> {
        let name = name.trim();
        let len = name.chars().count();
        if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&len) {
            return Err(DomainError::validation(
                "name",
                format!(
                    "Clan name must be {} to {} characters",
                    MIN_NAME_LENGTH, MAX_NAME_LENGTH
                ),
            ));
        }
        Ok(name.to_string())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &ClanId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    pub fn invite_code(&self) -> &ShareCode {
        &self.invite_code
    }

    pub fn max_members(&self) -> u32 {
        self.max_members
    }

    pub fn members(&self) -> &[ClanMember] {
        &self.members
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    pub fn member(&self, user_id: &UserId) -> Option<&ClanMember> {
        self.members.iter().find(|m| &m.user_id == user_id)
    }

    pub fn is_member(&self, user_id: &UserId) -> bool {
        self.member(user_id).is_some()
    }

    pub fn role_of(&self, user_id: &UserId) -> Option<ClanRole> {
        self.member(user_id).map(|m| m.role)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Membership
    // ─────────────────────────────────────────────────────────────────────────

    /// Adds a member. Joining a clan you are already in is a no-op.
    pub fn join(&mut self, user_id: UserId, display_name: impl Into<String>) -> Result<(), DomainError> {
        if self.is_member(&user_id) {
            return Ok(());
        }
        if self.members.len() as u32 >= self.max_members {
            return Err(DomainError::new(ErrorCode::ClanFull, "Clan is full"));
        }
        self.members.push(ClanMember {
            user_id,
            display_name: display_name.into(),
            role: ClanRole::Member,
            joined_at: Timestamp::now(),
        });
        self.touch();
        Ok(())
    }

    pub fn leave(&mut self, user_id: &UserId) -> Result<ClanLeaveOutcome, DomainError> {
        if !self.is_member(user_id) {
            return Err(DomainError::validation("user_id", "Not a member of this clan"));
        }
        if &self.owner_id == user_id {
            if self.members.len() == 1 {
                self.members.clear();
                return Ok(ClanLeaveOutcome::Disbanded);
            }
            return Err(DomainError::forbidden(
                "Transfer ownership before leaving the clan",
            ));
        }
        self.members.retain(|m| &m.user_id != user_id);
        self.touch();
        Ok(ClanLeaveOutcome::Left)
    }

    /// Promotes or demotes a member between `Member` and `Admin`. Owner only.
    pub fn set_role(&mut self, by: &UserId, target: &UserId, role: ClanRole) -> Result<(), DomainError> {
        if &self.owner_id != by {
            return Err(DomainError::forbidden("Only the owner can change roles"));
        }
        if role == ClanRole::Owner {
            return self.transfer_ownership(by, target);
        }
        if target == by {
            return Err(DomainError::validation("user_id", "The owner cannot demote themselves"));
        }
        let member = self
            .members
            .iter_mut()
            .find(|m| &m.user_id == target)
            .ok_or_else(|| DomainError::validation("user_id", "Not a member of this clan"))?;
        member.role = role;
        self.touch();
        Ok(())
    }

    pub fn transfer_ownership(&mut self, by: &UserId, target: &UserId) -> Result<(), DomainError> {
        if &self.owner_id != by {
            return Err(DomainError::forbidden("Only the owner can transfer ownership"));
        }
        if !self.is_member(target) {
            return Err(DomainError::validation("user_id", "Not a member of this clan"));
        }
        for member in &mut self.members {
            if &member.user_id == target {
                member.role = ClanRole::Owner;
            } else if &member.user_id == by {
                member.role = ClanRole::Admin;
            }
        }
        self.owner_id = target.clone();
        self.touch();
        Ok(())
    }

    /// Removes someone else. Owners kick anyone; admins kick plain members.
    pub fn kick(&mut self, by: &UserId, target: &UserId) -> Result<(), DomainError> {
        let actor = self
            .role_of(by)
            .ok_or_else(|| DomainError::forbidden("Not a member of this clan"))?;
        let victim = self
            .role_of(target)
            .ok_or_else(|| DomainError::validation("user_id", "Not a member of this clan"))?;

        if by == target {
            return Err(DomainError::validation("user_id", "Use leave to remove yourself"));
        }
        if !actor.can_moderate() || victim >= actor {
            return Err(DomainError::forbidden("Not allowed to remove this member"));
        }

        self.members.retain(|m| &m.user_id != target);
        self.touch();
        Ok(())
    }

    /// Owners and admins start clan quiz sessions.
    pub fn authorize_moderator(&self, user_id: &UserId) -> Result<(), DomainError> {
        match self.role_of(user_id) {
            Some(role) if role.can_moderate() => Ok(()),
            _ => Err(DomainError::forbidden("Only clan owners and admins can do that")),
        }
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}
