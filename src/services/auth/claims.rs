/*
 * Responsibility
 * - 検証済みトークンから得られる呼び出し元の情報 (AuthClaims)
 * - ロール (ADMIN / FUNCIONARIO / PACIENTE)
 *
 * Notes
 * - middleware が request extensions に格納し、以降は読み取り専用
 */
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Funcionario,
    Paciente,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Funcionario, Role::Paciente];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Funcionario => "FUNCIONARIO",
            Role::Paciente => "PACIENTE",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "FUNCIONARIO" => Ok(Role::Funcionario),
            "PACIENTE" => Ok(Role::Paciente),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Caller identity attached to a request after the bearer token has been verified.
///
/// - `subject_id` comes from `sub` and is always present.
/// - `cpf` / `email` / `role` are passed through as-is; downstream services validate them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthClaims {
    pub subject_id: String,
    pub cpf: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

impl AuthClaims {
    pub fn has_any_role(&self, allowed: &[Role]) -> bool {
        self.role.is_some_and(|role| allowed.contains(&role))
    }
}
