//! Versioned bakery API
//!
//! Run with: cargo run -p bakery
//!
//! Then visit: http://127.0.0.1:8000/swagger
//!
//! Version 1 hands out cookies whenever asked, version 2 only once they
//! are properly baked.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use verapi::prelude::*;

/// Cookie recipe. Units may have been lost in translation...
#[derive(Debug, Clone, Serialize, Deserialize, Schema)]
struct Cookie {
    butter: f64,
    chocolate: f64,
    eggs: u32,
    flour: f64,
    salt: f64,
    sugar: f64,
    vanilla: f64,
    heat: f64,
    /// Seconds in the oven
    baking_time: f64,
}

type Trays = HashMap<u32, (Cookie, Instant)>;

#[derive(Clone, Default)]
struct Oven {
    next_id: Arc<AtomicU32>,
    trays: Arc<Mutex<Trays>>,
}

impl Oven {
    fn trays(&self) -> Result<std::sync::MutexGuard<'_, Trays>> {
        self.trays
            .lock()
            .map_err(|_| ApiError::internal("The oven is broken."))
    }
}

/// Put a cookie into the oven
async fn bake_cookie(
    State(oven): State<Oven>,
    Json(cookie): Json<Cookie>,
) -> Result<WithStatus<String, 202>> {
    let id = oven.next_id.fetch_add(1, Ordering::Relaxed);
    info!(id, baking_time = cookie.baking_time, "cookie in the oven");
    oven.trays()?.insert(id, (cookie, Instant::now()));
    Ok(WithStatus(id.to_string()))
}

/// Returns cookie, but cookie might be burned or not baked enough.
async fn get_cookie(State(oven): State<Oven>, Path(cookie_id): Path<u32>) -> Result<&'static str> {
    oven.trays()?
        .remove(&cookie_id)
        .map(|_| "🍪")
        .ok_or_else(|| ApiError::not_found("Cookie not found."))
}

/// Returns perfectly baked cookie.
async fn get_cookie_checked(
    State(oven): State<Oven>,
    Path(cookie_id): Path<u32>,
) -> Result<&'static str> {
    let mut trays = oven.trays()?;
    let (cookie, started) = trays
        .remove(&cookie_id)
        .ok_or_else(|| ApiError::not_found("Cookie not found."))?;

    let baking_time = Duration::from_secs_f64(cookie.baking_time);
    let elapsed = started.elapsed();
    if elapsed < baking_time.mul_f64(0.9) {
        trays.insert(cookie_id, (cookie, started));
        return Err(ApiError::new(
            StatusCode::PRECONDITION_FAILED,
            "too_early",
            "Too early, cookie is not yet baked.",
        ));
    }
    if elapsed > baking_time.mul_f64(1.1) {
        warn!(cookie_id, "cookie burned");
        return Err(ApiError::new(
            StatusCode::GONE,
            "burned",
            "Too late, cookie is burned.",
        ));
    }
    Ok("🍪")
}

async fn get_cake() -> Result<()> {
    Err(ApiError::not_found("The cake is a lie."))
}

fn openapi() -> OpenApiConfig {
    OpenApiConfig::new("Customized example API", "1.2.3")
        .description("Use the app metadata to customize your documents as usual.")
        .summary("Customized example of VerAPI")
        .openapi_url("/swagger.json")
        .tag(Tag::new("Cookies").description("Cookies are delicious."))
        .tag(Tag::new("Cake").description("The cake is a lie."))
        .server(Server::new("http://localhost:8000").description("Localhost"))
        .server(Server::new("http://127.0.0.1:8000").description("Loopback"))
        .docs_url("/swagger")
        .oauth2_redirect_url("/swagger/oauth2-redirect")
        .swagger_ui_parameter("syntaxHighlight.theme", "obsidian")
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let versioning = VersioningConfig::new()
        .default_version(2)
        .prefix_format("/version{version}")
        .include_all_routes(false)
        .primary_swagger_version(2)
        .filter_tags(true)
        .title_format("{title} - Version {version}")
        .description_format("{description}")
        .summary_format("{summary} - Version {version}")
        .swagger_favicon_url("https://www.google.com/favicon.ico")
        .swagger_css_urls(["https://cdn.jsdelivr.net/npm/swagger-ui-dist@5.9.0/swagger-ui.css"]);

    let mut app = App::new()
        .openapi(openapi())
        .state(Oven::default())
        .route(
            "/cookies",
            post(version([1, 2], bake_cookie))
                .tag("Cookies")
                .json_body::<Cookie>()
                .response(202, "Cookie is in the oven"),
        )
        .route(
            "/cookies/{cookie_id}",
            get(version([1], get_cookie)).tag("Cookies").deprecated(),
        )
        .route(
            "/cookies/{cookie_id}",
            get(get_cookie_checked).tag("Cookies"),
        )
        .route("/cake", get(version([1], get_cake)).tag("Cake"));

    let versions = app.versionize(versioning)?;
    info!(?versions, "bakery is open");

    app.run("127.0.0.1:8000").await
}
