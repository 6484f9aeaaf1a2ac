use crate::error::ServiceError;
use actix_web::HttpResponse;
use log::error;

pub mod servers;
pub mod stretch_upgrade;

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

fn log_failure(page: &'static str) -> impl Fn(ServiceError) -> ServiceError {
    move |e| {
        error!("Failed to serve {} page: {}", page, e);
        e
    }
}
