use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{Claims, CurrentUser, UserRole};
use crate::AppState;

/// Decode a bearer token issued by the external auth service into its
/// claims. Issuance and credential checks happen elsewhere; this side only
/// trusts the signed `{sub, role}` pair.
pub fn validate_token(token: &str, config: &Config) -> Result<Claims> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

/// Admin gate for mutation routes.
/// Extracts and validates the JWT from the Authorization header, requires
/// the admin role, and makes `CurrentUser` available to handlers.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return Err(AppError::Unauthorized(
                "Header Authorization tidak ada atau tidak valid".to_string(),
            ));
        }
    };

    let claims = validate_token(token, &state.config)?;

    let current_user = CurrentUser {
        id: claims.sub,
        role: UserRole::from_str(&claims.role),
    };

    if !current_user.is_admin() {
        return Err(AppError::Forbidden("Akses hanya untuk admin".to_string()));
    }

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token_for(role: &str, config: &Config) -> String {
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: "u-1".to_string(),
            role: role.to_string(),
            exp: now + 3600,
            iat: now,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt.secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_roundtrips_claims() {
        let config = Config::default();
        let token = token_for("admin", &config);

        let claims = validate_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert!(UserRole::from_str(&claims.role).is_admin());
    }

    #[test]
    fn token_with_wrong_secret_is_rejected() {
        let config = Config::default();
        let mut other = Config::default();
        other.jwt.secret = "secret-lain".to_string();

        let token = token_for("admin", &other);
        assert!(validate_token(&token, &config).is_err());
    }
}
