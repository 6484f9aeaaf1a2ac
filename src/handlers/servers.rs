use crate::appdata::{ApplicationData, WebData};
use crate::error::ServiceResult;
use crate::handlers::{html, log_failure};
use crate::templates::{self, ServersContext};
use actix_web::{web, HttpResponse};

pub async fn servers(data: WebData) -> ServiceResult<HttpResponse> {
    let body = web::block(move || render(&data))
        .await
        .map_err(Into::into)
        .map_err(log_failure("servers"))?;

    Ok(html(body))
}

fn render(data: &ApplicationData) -> ServiceResult<String> {
    let hosts = data.servers.get()?;
    let page = templates::servers(&ServersContext {
        title: &data.config.global.servers_title,
        hosts: &hosts,
    })?;

    Ok(page)
}
