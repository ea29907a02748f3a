//! Upstream targets and their per-path access rules.
//!
//! Each backend (auth, patient, consultation) is one `UpstreamTarget`, built once at startup
//! and shared read-only. A target carries a default `RouteRule` plus an ordered list of
//! path-prefix overrides; `resolve` picks the longest matching prefix.

use url::Url;

use crate::config::Config;
use crate::services::auth::Role;

/// Which identity headers the gateway injects from verified claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityHeaders {
    None,
    /// `x-user-id`, `x-user-cpf`, `x-user-email`
    Basic,
    /// `Basic` + `x-user-type`
    Full,
}

/// What happens to the caller's `Authorization` header on the way upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationHeader {
    Strip,
    Forward,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pub allowed_roles: Vec<Role>,
    pub identity: IdentityHeaders,
}

impl RouteRule {
    pub fn new(allowed_roles: &[Role], identity: IdentityHeaders) -> Self {
        Self {
            allowed_roles: allowed_roles.to_vec(),
            identity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathOverride {
    pub prefix: String,
    pub rule: RouteRule,
}

#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    /// Short service name used in logs and the 502 message.
    pub service: &'static str,
    /// Gateway path prefix, e.g. `/api/paciente`.
    pub mount: &'static str,
    pub base_url: Url,
    pub requires_auth: bool,
    pub authorization: AuthorizationHeader,
    pub default_rule: RouteRule,
    pub overrides: Vec<PathOverride>,
}

impl UpstreamTarget {
    /// Auth service: public, caller token never forwarded.
    pub fn auth(base_url: Url) -> Self {
        Self {
            service: "auth",
            mount: "/api/auth",
            base_url,
            requires_auth: false,
            authorization: AuthorizationHeader::Strip,
            default_rule: RouteRule::new(&[], IdentityHeaders::None),
            overrides: Vec::new(),
        }
    }

    /// Patient service: PACIENTE only, except search/listing which staff may also use.
    pub fn paciente(base_url: Url) -> Self {
        let shared = RouteRule::new(&[Role::Paciente, Role::Funcionario], IdentityHeaders::None);

        Self {
            service: "paciente",
            mount: "/api/paciente",
            base_url,
            requires_auth: true,
            authorization: AuthorizationHeader::Forward,
            default_rule: RouteRule::new(&[Role::Paciente], IdentityHeaders::None),
            overrides: vec![
                PathOverride {
                    prefix: "/buscar".into(),
                    rule: shared.clone(),
                },
                PathOverride {
                    prefix: "/todos".into(),
                    rule: shared,
                },
                PathOverride {
                    prefix: "/completar".into(),
                    rule: RouteRule::new(&[Role::Paciente], IdentityHeaders::Basic),
                },
            ],
        }
    }

    /// Consultation service: any authenticated role, full identity on every request.
    pub fn consulta(base_url: Url) -> Self {
        Self {
            service: "consulta",
            mount: "/api/consulta",
            base_url,
            requires_auth: true,
            authorization: AuthorizationHeader::Forward,
            default_rule: RouteRule::new(&Role::ALL, IdentityHeaders::Full),
            overrides: Vec::new(),
        }
    }

    /// Path after the mount prefix (`/api/paciente/buscar` → `/buscar`, `/api/paciente` → ``).
    pub fn suffix<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.mount)?;
        (rest.is_empty() || rest.starts_with('/')).then_some(rest)
    }

    /// Rule for a suffix: the longest override prefix matching on a segment boundary, else default.
    pub fn resolve(&self, suffix: &str) -> &RouteRule {
        self.overrides
            .iter()
            .filter(|o| prefix_matches(&o.prefix, suffix))
            .max_by_key(|o| o.prefix.len())
            .map(|o| &o.rule)
            .unwrap_or(&self.default_rule)
    }

    /// Full upstream URL for a suffix + optional query string.
    pub fn url_for(&self, suffix: &str, query: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        let base = url.path().trim_end_matches('/').to_string();
        let path = match (base.is_empty(), suffix.is_empty()) {
            (true, true) => "/".to_string(),
            (_, true) => base,
            _ => format!("{base}{suffix}"),
        };
        url.set_path(&path);
        url.set_query(query.filter(|q| !q.is_empty()));
        url
    }
}

fn prefix_matches(prefix: &str, suffix: &str) -> bool {
    match suffix.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/'),
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Auth,
    Paciente,
    Consulta,
}

/// The three configured upstreams.
#[derive(Debug, Clone)]
pub struct Upstreams {
    pub auth: UpstreamTarget,
    pub paciente: UpstreamTarget,
    pub consulta: UpstreamTarget,
}

impl Upstreams {
    pub fn from_config(config: &Config) -> Self {
        Self {
            auth: UpstreamTarget::auth(config.auth_ms_url.clone()),
            paciente: UpstreamTarget::paciente(config.paciente_ms_url.clone()),
            consulta: UpstreamTarget::consulta(config.consulta_ms_url.clone()),
        }
    }

    pub fn get(&self, service: Service) -> &UpstreamTarget {
        match service {
            Service::Auth => &self.auth,
            Service::Paciente => &self.paciente,
            Service::Consulta => &self.consulta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn paciente() -> UpstreamTarget {
        UpstreamTarget::paciente(url("http://paciente-service:8082"))
    }

    #[test]
    fn suffix_respects_segment_boundary() {
        let t = paciente();
        assert_eq!(t.suffix("/api/paciente/buscar"), Some("/buscar"));
        assert_eq!(t.suffix("/api/paciente"), Some(""));
        assert_eq!(t.suffix("/api/pacientes"), None);
        assert_eq!(t.suffix("/api/consulta/x"), None);
    }

    #[test]
    fn search_and_listing_allow_staff() {
        let t = paciente();
        for suffix in ["/buscar", "/buscar/123", "/todos"] {
            let rule = t.resolve(suffix);
            assert_eq!(rule.allowed_roles, vec![Role::Paciente, Role::Funcionario]);
            assert_eq!(rule.identity, IdentityHeaders::None);
        }
    }

    #[test]
    fn other_patient_paths_are_patient_only() {
        let t = paciente();
        for suffix in ["", "/", "/editar/1", "/pontos/saldo", "/buscarx"] {
            assert_eq!(t.resolve(suffix).allowed_roles, vec![Role::Paciente], "{suffix}");
        }
    }

    #[test]
    fn complete_profile_injects_basic_identity() {
        let t = paciente();
        let rule = t.resolve("/completar");
        assert_eq!(rule.allowed_roles, vec![Role::Paciente]);
        assert_eq!(rule.identity, IdentityHeaders::Basic);
    }

    #[test]
    fn longest_prefix_wins() {
        let mut t = paciente();
        t.overrides.push(PathOverride {
            prefix: "/buscar/admin".into(),
            rule: RouteRule::new(&[Role::Admin], IdentityHeaders::Full),
        });

        assert_eq!(t.resolve("/buscar/admin/1").allowed_roles, vec![Role::Admin]);
        assert_eq!(
            t.resolve("/buscar/1").allowed_roles,
            vec![Role::Paciente, Role::Funcionario]
        );
    }

    #[test]
    fn consulta_allows_every_role_with_full_identity() {
        let t = UpstreamTarget::consulta(url("http://consulta-service:8083"));
        let rule = t.resolve("/consultas/42");
        assert_eq!(rule.allowed_roles, Role::ALL.to_vec());
        assert_eq!(rule.identity, IdentityHeaders::Full);
        assert!(t.requires_auth);
    }

    #[test]
    fn auth_is_public_and_strips_token() {
        let t = UpstreamTarget::auth(url("http://auth-service:8081"));
        assert!(!t.requires_auth);
        assert_eq!(t.authorization, AuthorizationHeader::Strip);
    }

    #[test]
    fn url_joins_suffix_and_query() {
        let t = paciente();
        assert_eq!(
            t.url_for("/buscar", Some("cpf=123")).as_str(),
            "http://paciente-service:8082/buscar?cpf=123"
        );
        assert_eq!(t.url_for("", None).as_str(), "http://paciente-service:8082/");
        assert_eq!(t.url_for("/todos", Some("")).as_str(), "http://paciente-service:8082/todos");
    }

    #[test]
    fn url_keeps_base_path() {
        let t = UpstreamTarget::consulta(url("http://gw.internal/consulta/"));
        assert_eq!(
            t.url_for("/consultas/7", None).as_str(),
            "http://gw.internal/consulta/consultas/7"
        );
        assert_eq!(t.url_for("", None).as_str(), "http://gw.internal/consulta");
    }
}
