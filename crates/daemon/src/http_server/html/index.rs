use askama::Template;
use axum::extract::State;
use axum::response::IntoResponse;

use crate::ServiceState;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub max_upload_mib: usize,
}

pub async fn handler(State(state): State<ServiceState>) -> impl IntoResponse {
    IndexTemplate {
        max_upload_mib: (state.max_upload_bytes() >> 20).max(1),
    }
}
