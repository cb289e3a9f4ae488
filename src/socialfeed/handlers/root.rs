#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Liveness text", body = String)),
    tag = "root"
)]
pub async fn root() -> &'static str {
    "Server is running"
}
