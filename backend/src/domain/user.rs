//! User data model.
//!
//! A user is a team member who can log in, be placed on project rosters and
//! accumulate reward points. Only the points balance changes after creation.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::PasswordHash;

/// Longest accepted username, in characters.
pub const USERNAME_MAX: usize = 64;
/// Longest accepted display name, in characters.
pub const DISPLAY_NAME_MAX: usize = 80;
/// Longest accepted skill label, in characters.
pub const SKILL_MAX: usize = 40;

/// Validation errors raised while building user values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyUsername,
    UsernameTooLong { max: usize },
    EmptyPassword,
    EmptyDisplayName,
    DisplayNameTooLong { max: usize },
    EmptySkill,
    SkillTooLong { max: usize },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::EmptyDisplayName => write!(f, "name must not be empty"),
            Self::DisplayNameTooLong { max } => {
                write!(f, "name must be at most {max} characters")
            }
            Self::EmptySkill => write!(f, "skills must not contain blank entries"),
            Self::SkillTooLong { max } => write!(f, "skills must be at most {max} characters"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Numeric user identifier allocated by the storage adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Wrap a raw identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique login name, trimmed of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Validate and construct a username.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if trimmed.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Human readable name shown on dashboards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a display name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Access role.
///
/// `Member` is the default role older records were stored with; it carries
/// the same rights as `User`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Member,
}

impl Role {
    /// Whether the role unlocks admin-only operations.
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Normalise skill labels: trim, reject blanks, drop case-insensitive repeats.
pub fn normalise_skills<I, S>(raw: I) -> Result<Vec<String>, UserValidationError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut skills: Vec<String> = Vec::new();
    for skill in raw {
        let trimmed = skill.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptySkill);
        }
        if trimmed.chars().count() > SKILL_MAX {
            return Err(UserValidationError::SkillTooLong { max: SKILL_MAX });
        }
        if !skills.iter().any(|known| known.eq_ignore_ascii_case(trimmed)) {
            skills.push(trimmed.to_owned());
        }
    }
    Ok(skills)
}

/// Application user as held by the credential store.
///
/// ## Invariants
/// - `username` is unique across the store (enforced by the services that
///   create users).
/// - `points` only grows, through [`User::credited`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Username,
    password_hash: PasswordHash,
    name: DisplayName,
    role: Role,
    avatar: Option<String>,
    points: u64,
    skills: Vec<String>,
}

impl User {
    /// Start building a user with the identity fields every record needs.
    pub fn builder(
        id: UserId,
        username: Username,
        password_hash: PasswordHash,
        name: DisplayName,
    ) -> UserBuilder {
        UserBuilder {
            user: Self {
                id,
                username,
                password_hash,
                name,
                role: Role::User,
                avatar: None,
                points: 0,
                skills: Vec::new(),
            },
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    pub fn points(&self) -> u64 {
        self.points
    }

    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    /// Whether the user lists `skill`, ignoring ASCII case.
    pub fn has_skill(&self, skill: &str) -> bool {
        let wanted = skill.trim();
        self.skills
            .iter()
            .any(|known| known.eq_ignore_ascii_case(wanted))
    }

    /// Copy of this user with `reward` points added, or `None` on overflow.
    ///
    /// # Examples
    /// ```
    /// use teamboard::domain::{DisplayName, PasswordHash, User, UserId, Username};
    ///
    /// let hash: PasswordHash = "aa.bb".parse().unwrap();
    /// let user = User::builder(
    ///     UserId::new(1),
    ///     Username::new("ada").unwrap(),
    ///     hash,
    ///     DisplayName::new("Ada").unwrap(),
    /// )
    /// .points(40)
    /// .build();
    /// assert_eq!(user.credited(60).unwrap().points(), 100);
    /// ```
    pub fn credited(&self, reward: u64) -> Option<Self> {
        let points = self.points.checked_add(reward)?;
        Some(Self {
            points,
            ..self.clone()
        })
    }
}

/// Builder for [`User`] optional fields.
#[derive(Debug, Clone)]
pub struct UserBuilder {
    user: User,
}

impl UserBuilder {
    pub fn role(mut self, role: Role) -> Self {
        self.user.role = role;
        self
    }

    pub fn avatar(mut self, avatar: Option<String>) -> Self {
        self.user.avatar = avatar.filter(|value| !value.trim().is_empty());
        self
    }

    pub fn points(mut self, points: u64) -> Self {
        self.user.points = points;
        self
    }

    /// Set already-normalised skills (see [`normalise_skills`]).
    pub fn skills(mut self, skills: Vec<String>) -> Self {
        self.user.skills = skills;
        self
    }

    pub fn build(self) -> User {
        self.user
    }
}

/// Hashed user record that has not been given an id yet.
///
/// Storage adapters allocate the id when inserting and turn the draft into a
/// [`User`] with [`UserDraft::into_user`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub username: Username,
    pub password_hash: PasswordHash,
    pub name: DisplayName,
    pub role: Role,
    pub avatar: Option<String>,
    pub skills: Vec<String>,
}

impl UserDraft {
    /// Materialise the draft under `id` with a zero points balance.
    pub fn into_user(self, id: UserId) -> User {
        User::builder(id, self.username, self.password_hash, self.name)
            .role(self.role)
            .avatar(self.avatar)
            .skills(self.skills)
            .build()
    }
}

/// Validated input for creating a user account.
///
/// The password is plaintext here and is hashed by the account service before
/// anything is stored.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub password: Zeroizing<String>,
    pub name: DisplayName,
    pub avatar: Option<String>,
    pub skills: Vec<String>,
}

impl NewUser {
    /// Validate raw inputs.
    pub fn try_from_parts(
        username: &str,
        password: &str,
        name: &str,
        avatar: Option<String>,
        skills: Vec<String>,
    ) -> Result<Self, UserValidationError> {
        let username = Username::new(username)?;
        if password.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }
        let name = DisplayName::new(name)?;
        let skills = normalise_skills(skills)?;
        Ok(Self {
            username,
            password: Zeroizing::new(password.to_owned()),
            name,
            avatar,
            skills,
        })
    }
}
