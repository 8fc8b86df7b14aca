use when2fly_common::request_io::{OutputNotification, OutputNotificationToggled};
use when2fly_common::service::NotificationService;
use when2fly_common::store::Store;

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::handlers::error::{DoesNotExistType, HttpErrorResponse};
use crate::middleware::auth::AuthenticatedUser;

pub async fn get(
    store: web::Data<Store>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, HttpErrorResponse> {
    let notifications = web::block(move || {
        NotificationService::new(&store).get_notifications(&user.claims.user_id)
    })
    .await?
    .map_err(|e| {
        HttpErrorResponse::from_service_error(
            e,
            DoesNotExistType::Notification,
            "Failed to get notifications",
        )
    })?;

    Ok(HttpResponse::Ok().json(
        notifications
            .into_iter()
            .map(OutputNotification::from)
            .collect::<Vec<_>>(),
    ))
}

pub async fn toggle_read(
    store: web::Data<Store>,
    user: AuthenticatedUser,
    notification_id: web::Path<Uuid>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let notification_id = notification_id.into_inner();

    let notification = web::block(move || {
        NotificationService::new(&store).toggle_read(&user.claims.user_id, notification_id)
    })
    .await?
    .map_err(|e| {
        HttpErrorResponse::from_service_error(
            e,
            DoesNotExistType::Notification,
            "Failed to update notification",
        )
    })?;

    let message = if notification.is_read {
        "Notification marked as read"
    } else {
        "Notification marked as unread"
    };

    Ok(HttpResponse::Ok().json(OutputNotificationToggled {
        message: String::from(message),
        notification: notification.into(),
    }))
}
