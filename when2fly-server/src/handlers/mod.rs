pub mod flight;
pub mod health;
pub mod notification;
pub mod user;

pub const CORS_ALLOWED_HEADERS_VALUE: &str = "Authorization, Content-Type";

pub mod error {
    use when2fly_common::request_io::{ErrorType, ServerErrorResponse};
    use when2fly_common::service::ServiceError;
    use when2fly_common::token::TokenError;

    use actix_web::http::StatusCode;
    use actix_web::{HttpResponse, HttpResponseBuilder};
    use std::fmt;

    pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

    #[derive(Debug)]
    pub enum DoesNotExistType {
        User,
        Flight,
        Notification,
    }

    #[derive(Debug)]
    pub enum HttpErrorResponse {
        // 400
        IncorrectlyFormed(String),

        // 401
        BadToken(String),
        TokenExpired(String),
        TokenMissing(String),

        // 403
        UserDisallowed(String),

        // 404
        DoesNotExist(String, DoesNotExistType),

        // 500
        InternalError(String),
    }

    impl HttpErrorResponse {
        /// Logs the underlying failure and hides it from the caller.
        pub fn from_service_error(
            err: ServiceError,
            dne_type: DoesNotExistType,
            context: &str,
        ) -> Self {
            match err {
                ServiceError::Validation(msg) => HttpErrorResponse::IncorrectlyFormed(msg),
                ServiceError::NotFound => HttpErrorResponse::DoesNotExist(
                    match dne_type {
                        DoesNotExistType::User => String::from("User not found"),
                        DoesNotExistType::Flight => String::from("Flight not found"),
                        DoesNotExistType::Notification => {
                            String::from("Notification not found")
                        }
                    },
                    dne_type,
                ),
                ServiceError::Dependency(e) => {
                    log::error!("{context}: {e}");
                    HttpErrorResponse::InternalError(String::from(context))
                }
            }
        }
    }

    impl std::error::Error for HttpErrorResponse {}

    impl fmt::Display for HttpErrorResponse {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let server_error: ServerErrorResponse = self.into();
            write!(f, "{:?}", server_error)
        }
    }

    impl From<HttpErrorResponse> for ServerErrorResponse {
        fn from(resp: HttpErrorResponse) -> Self {
            (&resp).into()
        }
    }

    impl From<&HttpErrorResponse> for ServerErrorResponse {
        fn from(resp: &HttpErrorResponse) -> Self {
            match resp {
                // 400
                HttpErrorResponse::IncorrectlyFormed(msg) => ServerErrorResponse {
                    err_type: ErrorType::IncorrectlyFormed,
                    err_message: msg.clone(),
                },

                // 401
                HttpErrorResponse::BadToken(msg) => ServerErrorResponse {
                    err_type: ErrorType::BadToken,
                    err_message: format!("Bad token: {msg}"),
                },
                HttpErrorResponse::TokenExpired(msg) => ServerErrorResponse {
                    err_type: ErrorType::TokenExpired,
                    err_message: format!("Token expired: {msg}"),
                },
                HttpErrorResponse::TokenMissing(msg) => ServerErrorResponse {
                    err_type: ErrorType::TokenMissing,
                    err_message: format!("Token missing: {msg}"),
                },

                // 403
                HttpErrorResponse::UserDisallowed(msg) => ServerErrorResponse {
                    err_type: ErrorType::UserDisallowed,
                    err_message: format!("User disallowed: {msg}"),
                },

                // 404
                HttpErrorResponse::DoesNotExist(msg, dne_type) => ServerErrorResponse {
                    err_type: match dne_type {
                        DoesNotExistType::User => ErrorType::UserDoesNotExist,
                        DoesNotExistType::Flight => ErrorType::FlightDoesNotExist,
                        DoesNotExistType::Notification => ErrorType::NotificationDoesNotExist,
                    },
                    err_message: format!("Does not exist: {msg}"),
                },

                // 500
                HttpErrorResponse::InternalError(_) => ServerErrorResponse {
                    err_type: ErrorType::InternalError,
                    err_message: String::from(INTERNAL_ERROR_MESSAGE),
                },
            }
        }
    }

    impl actix_web::error::ResponseError for HttpErrorResponse {
        fn error_response(&self) -> HttpResponse {
            HttpResponseBuilder::new(self.status_code()).json(ServerErrorResponse::from(self))
        }

        fn status_code(&self) -> StatusCode {
            match *self {
                HttpErrorResponse::IncorrectlyFormed(_) => StatusCode::BAD_REQUEST,
                HttpErrorResponse::BadToken(_)
                | HttpErrorResponse::TokenExpired(_)
                | HttpErrorResponse::TokenMissing(_) => StatusCode::UNAUTHORIZED,
                HttpErrorResponse::UserDisallowed(_) => StatusCode::FORBIDDEN,
                HttpErrorResponse::DoesNotExist(_, _) => StatusCode::NOT_FOUND,
                HttpErrorResponse::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    impl From<actix_web::error::BlockingError> for HttpErrorResponse {
        fn from(_err: actix_web::error::BlockingError) -> Self {
            log::error!("Actix thread pool failure");
            HttpErrorResponse::InternalError(String::from("Actix thread pool failure"))
        }
    }

    impl From<TokenError> for HttpErrorResponse {
        fn from(err: TokenError) -> Self {
            match err {
                TokenError::TokenInvalid => {
                    HttpErrorResponse::BadToken(String::from("Invalid token"))
                }
                TokenError::TokenExpired => {
                    HttpErrorResponse::TokenExpired(String::from("Token expired"))
                }
                TokenError::TokenMissing => {
                    HttpErrorResponse::TokenMissing(String::from("Missing token"))
                }
            }
        }
    }

}

#[cfg(test)]
pub mod test_utils {
    use when2fly_common::db::DaoError;
    use when2fly_common::models::notification::{Notification, NotificationDraft};
    use when2fly_common::models::user::User;
    use when2fly_common::store::{MemoryStore, NotificationRepository, Store};
    use when2fly_common::token::auth_token::{AuthToken, NewAuthTokenClaims};

    use chrono::{DateTime, Utc};
    use std::sync::Arc;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};
    use uuid::Uuid;

    use crate::env;

    pub fn memory_store() -> (Store, Arc<MemoryStore>) {
        let memory = Arc::new(MemoryStore::new());
        (Store::in_memory(memory.clone()), memory)
    }

    pub fn register_user(store: &Store, name: &str) -> User {
        let id = format!("google-{}", Uuid::now_v7());
        let email = format!("{}@g.ucla.edu", name.to_lowercase());

        store
            .users
            .upsert_user(&id, &email, name)
            .expect("Failed to register test user")
    }

    pub fn gen_token_for(user_id: &str, email: &str, name: &str) -> String {
        let expiration = SystemTime::now() + Duration::from_secs(600);
        let expiration = expiration.duration_since(UNIX_EPOCH).unwrap().as_secs();

        AuthToken::sign_new(
            NewAuthTokenClaims {
                user_id,
                user_email: email,
                user_name: name,
                expiration,
            },
            &env::CONF.token_signing_key,
        )
    }

    pub fn gen_token(user: &User) -> String {
        gen_token_for(&user.id, &user.email, &user.name)
    }

    pub fn bearer(token: &str) -> (&'static str, String) {
        ("Authorization", format!("Bearer {token}"))
    }

    pub fn time(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc)
    }

    /// Notification table whose writes always fail.
    pub struct FailingNotificationWrites {
        pub inner: Arc<MemoryStore>,
    }

    impl NotificationRepository for FailingNotificationWrites {
        fn create_notifications(&self, _drafts: &[NotificationDraft]) -> Result<(), DaoError> {
            Err(DaoError::CannotRunQuery("Notification insert rejected"))
        }

        fn get_notifications_for_user(
            &self,
            user_id: &str,
        ) -> Result<Vec<Notification>, DaoError> {
            self.inner.get_notifications_for_user(user_id)
        }

        fn get_notification(
            &self,
            notification_id: Uuid,
            user_id: &str,
        ) -> Result<Notification, DaoError> {
            self.inner.get_notification(notification_id, user_id)
        }

        fn toggle_notification_read(
            &self,
            notification_id: Uuid,
            user_id: &str,
        ) -> Result<Notification, DaoError> {
            self.inner.toggle_notification_read(notification_id, user_id)
        }

        fn delete_read_notifications_older_than(
            &self,
            cutoff: DateTime<Utc>,
        ) -> Result<usize, DaoError> {
            self.inner.delete_read_notifications_older_than(cutoff)
        }
    }
}
