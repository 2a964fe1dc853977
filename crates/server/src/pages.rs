//! Fixed HTML pages served by the relay.

use axum::{Router, response::Html, routing::get};

pub(crate) fn router() -> Router {
    Router::new().route("/", get(index)).route("/about", get(about))
}

async fn index() -> Html<&'static str> {
    Html("<h1>Hello World!</h1>")
}

async fn about() -> Html<&'static str> {
    Html("<h1>About Page</h1>")
}
