//! Authentication resolution
//!
//! An explicit `auth` block wins. Without one, the scheme is inferred from the
//! request's `Authorization` header. Nothing here fails: unknown input yields
//! an empty authentication and the headers come back untouched.

use super::variables::normalize;
use crate::models::insomnia::{
    ApiKeyAuth, AuthScheme, Authentication, AwsIamAuth, BasicAuth, BearerAuth, DigestAuth,
    Header, OAuth1Auth, OAuth2Auth,
};
use crate::models::postman::Auth;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::debug;

/// Headers the AWS signer regenerates, so they are not kept literally
const AWS_SIGNING_HEADERS: [&str; 4] = [
    "authorization",
    "x-amz-date",
    "x-amz-security-token",
    "x-amz-content-sha256",
];

/// Resolver output
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAuth {
    pub authentication: Authentication,
    pub headers: Vec<Header>,
}

/// Source auth types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    Basic,
    Bearer,
    Digest,
    OAuth1,
    OAuth2,
    ApiKey,
    AwsV4,
    Unknown,
}

impl From<&str> for AuthType {
    fn from(kind: &str) -> Self {
        match kind {
            "basic" => AuthType::Basic,
            "bearer" => AuthType::Bearer,
            "digest" => AuthType::Digest,
            "oauth1" => AuthType::OAuth1,
            "oauth2" => AuthType::OAuth2,
            "apikey" => AuthType::ApiKey,
            "awsv4" => AuthType::AwsV4,
            _ => AuthType::Unknown,
        }
    }
}

pub fn resolve(explicit: Option<&Auth>, headers: Vec<Header>) -> ResolvedAuth {
    match explicit {
        Some(auth) => ResolvedAuth {
            authentication: from_explicit(auth),
            headers,
        },
        None => from_headers(headers),
    }
}

fn from_explicit(auth: &Auth) -> Authentication {
    let scheme = match AuthType::from(auth.kind.as_str()) {
        AuthType::Basic => AuthScheme::Basic(BasicAuth {
            disabled: false,
            username: param(auth, "username"),
            password: param(auth, "password"),
        }),
        AuthType::Bearer => AuthScheme::Bearer(BearerAuth {
            disabled: false,
            token: param(auth, "token"),
            prefix: String::new(),
        }),
        AuthType::Digest => AuthScheme::Digest(DigestAuth {
            disabled: false,
            username: param(auth, "username"),
            password: param(auth, "password"),
        }),
        AuthType::OAuth1 => AuthScheme::OAuth1(OAuth1Auth {
            disabled: false,
            consumer_key: param(auth, "consumerKey"),
            consumer_secret: param(auth, "consumerSecret"),
            token_key: param(auth, "token"),
            token_secret: param(auth, "tokenSecret"),
            private_key: param(auth, "privateKey"),
            signature_method: auth
                .param("signatureMethod")
                .map(|method| normalize(&method))
                .unwrap_or_else(|| "HMAC-SHA1".to_string()),
            version: auth
                .param("version")
                .map(|version| normalize(&version))
                .unwrap_or_else(|| "1.0".to_string()),
            nonce: param(auth, "nonce"),
            timestamp: param(auth, "timestamp"),
            callback: param(auth, "callback"),
            realm: param(auth, "realm"),
            verifier: param(auth, "verifier"),
        }),
        AuthType::OAuth2 => {
            let (grant_type, use_pkce) = oauth2_grant_type(auth.param("grant_type").as_deref());
            AuthScheme::OAuth2(OAuth2Auth {
                disabled: false,
                grant_type: grant_type.to_string(),
                access_token_url: param(auth, "accessTokenUrl"),
                authorization_url: param(auth, "authUrl"),
                client_id: param(auth, "clientId"),
                client_secret: param(auth, "clientSecret"),
                scope: param(auth, "scope"),
                redirect_url: param(auth, "redirect_uri"),
                state: param(auth, "state"),
                username: param(auth, "username"),
                password: param(auth, "password"),
                use_pkce,
            })
        }
        AuthType::ApiKey => AuthScheme::ApiKey(ApiKeyAuth {
            disabled: false,
            key: param(auth, "key"),
            value: param(auth, "value"),
            add_to: match auth.param("in").as_deref() {
                Some("query") => "queryParams".to_string(),
                _ => "header".to_string(),
            },
        }),
        AuthType::AwsV4 => AuthScheme::AwsIam(AwsIamAuth {
            disabled: false,
            access_key_id: param(auth, "accessKey"),
            secret_access_key: param(auth, "secretKey"),
            region: param(auth, "region"),
            service: param(auth, "service"),
            session_token: param(auth, "sessionToken"),
        }),
        AuthType::Unknown => {
            debug!(auth_type = %auth.kind, "Unsupported auth type, leaving authentication empty");
            return Authentication::none();
        }
    };

    scheme.into()
}

/// Explicit parameter value with template tokens normalized
fn param(auth: &Auth, name: &str) -> String {
    normalize(&auth.param_or_default(name))
}

/// Map a grant type to the destination name and a PKCE flag
fn oauth2_grant_type(grant_type: Option<&str>) -> (&'static str, bool) {
    match grant_type {
        Some("authorization_code_with_pkce") => ("authorization_code", true),
        Some("client_credentials") => ("client_credentials", false),
        Some("password_credentials") | Some("password") => ("password", false),
        Some("implicit") => ("implicit", false),
        _ => ("authorization_code", false),
    }
}

fn from_headers(headers: Vec<Header>) -> ResolvedAuth {
    let authorization = headers
        .iter()
        .find(|h| !h.disabled && h.name.eq_ignore_ascii_case("authorization"))
        .map(|h| h.value.trim().to_string());

    let Some(value) = authorization else {
        return ResolvedAuth {
            authentication: Authentication::none(),
            headers,
        };
    };

    let (scheme, credentials) = match value.split_once(char::is_whitespace) {
        Some((scheme, rest)) => (scheme, rest.trim()),
        None => (value.as_str(), ""),
    };

    let authentication: Authentication = match scheme.to_ascii_lowercase().as_str() {
        "bearer" => AuthScheme::Bearer(BearerAuth {
            disabled: false,
            token: credentials.to_string(),
            prefix: String::new(),
        })
        .into(),
        "basic" => basic_from_credentials(credentials).into(),
        "digest" => {
            let params = parse_auth_params(credentials);
            AuthScheme::Digest(DigestAuth {
                disabled: false,
                username: lookup(&params, "username"),
                password: String::new(),
            })
            .into()
        }
        "oauth" => oauth1_from_params(&parse_auth_params(credentials)).into(),
        "aws4-hmac-sha256" => return aws_from_headers(credentials, headers),
        _ => Authentication::none(),
    };

    ResolvedAuth {
        authentication,
        headers,
    }
}

fn basic_from_credentials(credentials: &str) -> AuthScheme {
    let decoded = STANDARD
        .decode(credentials)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok());

    let (username, password) = match decoded {
        Some(decoded) => match decoded.split_once(':') {
            Some((user, pass)) => (user.to_string(), pass.to_string()),
            None => (decoded, String::new()),
        },
        // e.g. a template reference that cannot be decoded here
        None => (credentials.to_string(), String::new()),
    };

    AuthScheme::Basic(BasicAuth {
        disabled: false,
        username,
        password,
    })
}

fn oauth1_from_params(params: &[(String, String)]) -> AuthScheme {
    AuthScheme::OAuth1(OAuth1Auth {
        disabled: false,
        consumer_key: lookup(params, "oauth_consumer_key"),
        consumer_secret: String::new(),
        token_key: lookup(params, "oauth_token"),
        token_secret: String::new(),
        private_key: String::new(),
        signature_method: lookup(params, "oauth_signature_method"),
        version: lookup(params, "oauth_version"),
        nonce: lookup(params, "oauth_nonce"),
        timestamp: lookup(params, "oauth_timestamp"),
        callback: lookup(params, "oauth_callback"),
        realm: lookup(params, "realm"),
        verifier: lookup(params, "oauth_verifier"),
    })
}

/// `Credential=AKID/20240101/us-east-1/s3/aws4_request, SignedHeaders=.., Signature=..`
fn aws_from_headers(credentials: &str, headers: Vec<Header>) -> ResolvedAuth {
    let params = parse_auth_params(credentials);
    let credential = lookup(&params, "Credential");
    let scope: Vec<&str> = credential.split('/').collect();

    let session_token = headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case("x-amz-security-token"))
        .map(|h| h.value.clone())
        .unwrap_or_default();

    let remaining = headers
        .into_iter()
        .filter(|h| {
            !AWS_SIGNING_HEADERS
                .iter()
                .any(|name| h.name.eq_ignore_ascii_case(name))
        })
        .collect();

    ResolvedAuth {
        authentication: AuthScheme::AwsIam(AwsIamAuth {
            disabled: false,
            access_key_id: scope.first().copied().unwrap_or_default().to_string(),
            secret_access_key: String::new(),
            region: scope.get(2).copied().unwrap_or_default().to_string(),
            service: scope.get(3).copied().unwrap_or_default().to_string(),
            session_token,
        })
        .into(),
        headers: remaining,
    }
}

/// Split `a="1", b=2` into pairs, dropping surrounding quotes
fn parse_auth_params(credentials: &str) -> Vec<(String, String)> {
    credentials
        .split(',')
        .filter_map(|part| part.trim().split_once('='))
        .map(|(key, value)| {
            (
                key.trim().to_string(),
                value.trim().trim_matches('"').to_string(),
            )
        })
        .collect()
}

fn lookup(params: &[(String, String)], key: &str) -> String {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
        .unwrap_or_default()
}
