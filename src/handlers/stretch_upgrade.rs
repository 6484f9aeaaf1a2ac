use crate::appdata::{ApplicationData, WebData};
use crate::error::ServiceResult;
use crate::handlers::{html, log_failure};
use crate::inventory::migration::MigrationStatus;
use crate::templates::{self, StretchUpgradeContext};
use actix_web::{web, HttpResponse};

pub async fn stretch_upgrade(data: WebData) -> ServiceResult<HttpResponse> {
    let body = web::block(move || render(&data))
        .await
        .map_err(Into::into)
        .map_err(log_failure("stretch upgrade"))?;

    Ok(html(body))
}

fn render(data: &ApplicationData) -> ServiceResult<String> {
    let servers = data.upgrades.get()?;
    let page = templates::stretch_upgrade(&StretchUpgradeContext {
        title: &data.config.global.upgrade_title,
        servers: &servers,
        blocked: MigrationStatus::Blocked,
        upgraded: MigrationStatus::Upgraded,
    })?;

    Ok(page)
}
