use when2fly_common::request_io::{InputTimezone, InputUserName, OutputUser};
use when2fly_common::service::ServiceError;
use when2fly_common::store::Store;
use when2fly_common::validators::{self, Validity};

use actix_web::{web, HttpResponse};

use crate::env;
use crate::handlers::error::{DoesNotExistType, HttpErrorResponse};
use crate::middleware::auth::AuthenticatedUser;

/// Registers the caller on first login, or refreshes their email on later logins.
pub async fn register(
    store: web::Data<Store>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, HttpErrorResponse> {
    let email = user.claims.user_email.trim().to_lowercase();

    if let Validity::Invalid(msg) = validators::validate_email_address(&email) {
        return Err(HttpErrorResponse::IncorrectlyFormed(msg));
    }

    if let Validity::Invalid(msg) =
        validators::validate_email_domain(&email, &env::CONF.allowed_email_domain)
    {
        return Err(HttpErrorResponse::UserDisallowed(msg));
    }

    let name = user.claims.user_name.trim().to_string();
    let name = if validators::validate_user_name(&name).is_valid() {
        name
    } else {
        // Fall back to the local part of the address when the identity provider has no usable name
        email.split('@').next().unwrap_or_default().to_string()
    };

    let registered = web::block(move || {
        store
            .users
            .upsert_user(&user.claims.user_id, &email, &name)
    })
    .await?
    .map_err(|e| {
        HttpErrorResponse::from_service_error(
            ServiceError::Dependency(e),
            DoesNotExistType::User,
            "Failed to register user",
        )
    })?;

    Ok(HttpResponse::Ok().json(OutputUser::from(registered)))
}

pub async fn get(
    store: web::Data<Store>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, HttpErrorResponse> {
    let found = web::block(move || store.users.get_user(&user.claims.user_id))
        .await?
        .map_err(|e| {
            HttpErrorResponse::from_service_error(
                e.into(),
                DoesNotExistType::User,
                "Failed to get user",
            )
        })?;

    Ok(HttpResponse::Ok().json(OutputUser::from(found)))
}

pub async fn edit_name(
    store: web::Data<Store>,
    user: AuthenticatedUser,
    new_name: web::Json<InputUserName>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let Some(new_name) = new_name.into_inner().new_name else {
        return Err(HttpErrorResponse::IncorrectlyFormed(String::from(
            "Missing required field 'newName'",
        )));
    };

    let new_name = new_name.trim().to_string();
    if let Validity::Invalid(msg) = validators::validate_user_name(&new_name) {
        return Err(HttpErrorResponse::IncorrectlyFormed(msg));
    }

    let updated = web::block(move || {
        store
            .users
            .update_user_name(&user.claims.user_id, &new_name)
    })
    .await?
    .map_err(|e| {
        HttpErrorResponse::from_service_error(
            e.into(),
            DoesNotExistType::User,
            "Failed to update user's name",
        )
    })?;

    Ok(HttpResponse::Ok().json(OutputUser::from(updated)))
}

pub async fn edit_timezone(
    store: web::Data<Store>,
    user: AuthenticatedUser,
    timezone: web::Json<InputTimezone>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let Some(timezone) = timezone.into_inner().timezone else {
        return Err(HttpErrorResponse::IncorrectlyFormed(String::from(
            "Missing required field 'timezone'",
        )));
    };

    let timezone = timezone.trim().to_string();
    if let Validity::Invalid(msg) = validators::validate_timezone(&timezone) {
        return Err(HttpErrorResponse::IncorrectlyFormed(msg));
    }

    let updated = web::block(move || {
        store
            .users
            .update_user_timezone(&user.claims.user_id, &timezone)
    })
    .await?
    .map_err(|e| {
        HttpErrorResponse::from_service_error(
            e.into(),
            DoesNotExistType::User,
            "Failed to update user's timezone",
        )
    })?;

    Ok(HttpResponse::Ok().json(OutputUser::from(updated)))
}
