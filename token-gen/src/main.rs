use chrono::Utc;
use clap::{Parser, ValueEnum};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;
use uuid::Uuid;

/// Mint an HS256 bearer token the API gateway accepts.
///
/// Claims mirror what the auth service issues:
/// - `sub` (subject id), `cpf`, `email`, `type` (role)
/// - `iat` / `exp`
#[derive(Parser, Debug)]
#[command(name = "token-gen", version, about)]
struct Args {
    /// Shared HS256 secret (same value as the gateway's JWT_SECRET)
    #[arg(long, env = "JWT_SECRET")]
    secret: String,

    /// Subject id. Default: random UUID v4.
    #[arg(long)]
    sub: Option<String>,

    #[arg(long)]
    cpf: Option<String>,

    #[arg(long)]
    email: Option<String>,

    /// Caller role (`type` claim)
    #[arg(long, value_enum)]
    role: Option<RoleArg>,

    /// Token lifetime in seconds. Negative values produce an already-expired token.
    #[arg(long, default_value_t = 3600, allow_hyphen_values = true)]
    ttl_seconds: i64,

    /// Omit `sub` entirely (to exercise the missing-subject path)
    #[arg(long, default_value_t = false, conflicts_with = "sub")]
    no_sub: bool,

    /// Print only the token (no extra lines)
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[value(rename_all = "UPPER")]
enum RoleArg {
    Admin,
    Funcionario,
    Paciente,
}

impl RoleArg {
    fn as_str(self) -> &'static str {
        match self {
            RoleArg::Admin => "ADMIN",
            RoleArg::Funcionario => "FUNCIONARIO",
            RoleArg::Paciente => "PACIENTE",
        }
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cpf: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    iat: i64,
    exp: i64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let iat = Utc::now().timestamp();
    let sub = if args.no_sub {
        None
    } else {
        Some(args.sub.clone().unwrap_or_else(|| Uuid::new_v4().to_string()))
    };

    let claims = Claims {
        sub,
        cpf: args.cpf.as_deref(),
        email: args.email.as_deref(),
        role: args.role.map(RoleArg::as_str),
        iat,
        exp: iat + args.ttl_seconds,
    };

    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".to_string());
    let token = jsonwebtoken::encode(
        &header,
        &claims,
        &EncodingKey::from_secret(args.secret.as_bytes()),
    )?;

    if args.quiet {
        println!("{}", token);
        return Ok(());
    }

    println!("token: {}", token);
    println!("sub: {}", claims.sub.as_deref().unwrap_or("(none)"));
    println!("type: {}", claims.role.unwrap_or("(none)"));
    println!("exp: {}", claims.exp);
    println!("Authorization: Bearer {}", token);

    Ok(())
}
