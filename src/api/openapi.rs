use super::handlers::{auth, foods, health};
use utoipa::openapi::{Contact, InfoBuilder, License, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Reuse the same router wiring and only return the generated OpenAPI document.
    let (_router, mut openapi) = public_router().split_for_parts();
    let (_router, protected) = protected_router().split_for_parts();
    openapi.merge(protected);
    openapi
}

/// Routes open to everyone.
///
/// Add new endpoints here via `.routes(routes!(...))` so they are both served
/// and included in the generated `OpenAPI` document. Legacy aliases and `OPTIONS /health`
/// are added in `api::app` and stay undocumented.
pub(crate) fn public_router() -> OpenApiRouter {
    OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .routes(routes!(foods::listing::featured_foods))
        .routes(routes!(foods::listing::food_by_id))
        .routes(routes!(foods::listing::remaining_food_by_id))
        .routes(routes!(foods::listing::available_foods))
        .routes(routes!(foods::manage::add_food))
        .routes(routes!(foods::manage::cancel_request))
        .routes(routes!(foods::manage::foods_request))
        .routes(routes!(foods::manage::update_food))
        .routes(routes!(foods::manage::delete_food))
        .routes(routes!(auth::token::issue_token))
        .routes(routes!(auth::token::logout))
}

/// Routes wrapped by the token middleware in `api::app`.
pub(crate) fn protected_router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(foods::mine::manage_my_foods))
        .routes(routes!(foods::mine::my_requested_foods))
}

fn tag(name: &str, description: &str) -> Tag {
    let mut tag = Tag::new(name);
    tag.description = Some(description.to_string());
    tag
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    // Use Cargo.toml metadata instead of the utoipa-axum crate info defaults.
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(optional_str(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = cargo_contact();
    info.license = optional_str(env!("CARGO_PKG_LICENSE")).map(|identifier| {
        let mut license = License::new(identifier);
        license.identifier = Some(identifier.to_string());
        license
    });

    OpenApiBuilder::new()
        .info(info)
        .tags(Some(vec![
            tag("foods", "Food listings"),
            tag("requests", "Requesting and cancelling listings"),
            tag("my-foods", "Listings of the signed-in user (token cookie required)"),
            tag("auth", "Token cookie issuance"),
            tag("health", "Service health"),
        ]))
        .build()
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors are `;` separated and may include "Name <email>".
    let primary = env!("CARGO_PKG_AUTHORS").split(';').next().map(str::trim)?;
    let (name, email) = match primary.split_once('<') {
        Some((name, email)) => (name.trim(), email.trim_end_matches('>').trim()),
        None => (primary, ""),
    };
    if name.is_empty() && email.is_empty() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = optional_str(name).map(str::to_string);
    contact.email = optional_str(email).map(str::to_string);
    Some(contact)
}

fn optional_str(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
