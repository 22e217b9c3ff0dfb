use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tourmap_shared::boundary::{BoundaryIndex, BoundaryKind, BoundarySet};
use tourmap_shared::models::{
    BoundaryUrls, FormRelay, OpinionRow, SheetUrls, SiteConfig, TileLayer, TravelRow, VenueRow,
};
use tourmap_shared::tabular;

#[derive(Debug, Clone, Serialize)]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

fn origin() -> Result<String, String> {
    web_sys::window()
        .ok_or_else(|| "No window".to_string())?
        .location()
        .origin()
        .map_err(|_| "No location origin".to_string())
}

/// Resolve a same-origin path (like the boundary files under `/static`)
/// against the page origin. Absolute URLs pass through.
pub fn absolute_url(origin: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else if url.starts_with('/') {
        format!("{}{}", origin, url)
    } else {
        format!("{}/{}", origin, url)
    }
}

async fn query<T: for<'de> Deserialize<'de>>(
    query_str: &str,
    variables: Option<serde_json::Value>,
) -> Result<T, String> {
    let req = GraphQLRequest {
        query: query_str.to_string(),
        variables,
    };

    let resp = reqwest::Client::new()
        .post(format!("{}/graphql", origin()?))
        .json(&req)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let gql_resp: GraphQLResponse<T> = resp.json().await.map_err(|e| e.to_string())?;

    if let Some(errors) = gql_resp.errors {
        if !errors.is_empty() {
            return Err(errors[0].message.clone());
        }
    }

    gql_resp.data.ok_or_else(|| "No data returned".to_string())
}

// Types mirroring the GraphQL schema

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldNameData {
    pub logical: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRelayData {
    pub endpoint: String,
    pub fields: Vec<FieldNameData>,
}

impl From<FormRelayData> for FormRelay {
    fn from(r: FormRelayData) -> Self {
        FormRelay {
            endpoint: r.endpoint,
            fields: r
                .fields
                .into_iter()
                .map(|f| (f.logical, f.name))
                .collect::<BTreeMap<_, _>>(),
        }
    }
}

/// Sheets, boundaries and tile layers already match the shared shapes; only
/// the relay field maps come over the wire as lists.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteData {
    pub sheets: SheetUrls,
    pub boundaries: BoundaryUrls,
    pub venue_map: TileLayer,
    pub opinion_map: TileLayer,
    pub travel_relay: FormRelayData,
    pub opinion_relay: FormRelayData,
}

impl From<SiteData> for SiteConfig {
    fn from(s: SiteData) -> Self {
        SiteConfig {
            sheets: s.sheets,
            boundaries: s.boundaries,
            venue_map: s.venue_map,
            opinion_map: s.opinion_map,
            travel_relay: s.travel_relay.into(),
            opinion_relay: s.opinion_relay.into(),
        }
    }
}

// API functions

#[derive(Deserialize)]
pub struct SiteResponse {
    pub site: SiteData,
}

const TILE_LAYER_FIELDS: &str = "urlTemplate attribution minZoom maxZoom center { lat lng } zoom";

fn site_query() -> String {
    format!(
        "query {{ site {{ \
         sheets {{ venues travels opinions }} \
         boundaries {{ countries provinces }} \
         venueMap {{ {t} }} opinionMap {{ {t} }} \
         travelRelay {{ endpoint fields {{ logical name }} }} \
         opinionRelay {{ endpoint fields {{ logical name }} }} }} }}",
        t = TILE_LAYER_FIELDS
    )
}

pub async fn fetch_site_config() -> Result<SiteConfig, String> {
    let resp: SiteResponse = query(&site_query(), None).await?;
    Ok(resp.site.into())
}

#[derive(Deserialize)]
pub struct BoundaryNamesResponse {
    #[serde(rename = "boundaryNames")]
    pub boundary_names: Vec<String>,
}

/// GraphQL enum literal for a boundary kind.
pub fn boundary_kind_arg(kind: BoundaryKind) -> &'static str {
    match kind {
        BoundaryKind::Province => "PROVINCE",
        BoundaryKind::Country => "COUNTRY",
    }
}

pub fn build_boundary_names_variables(kind: BoundaryKind) -> serde_json::Value {
    serde_json::json!({ "kind": boundary_kind_arg(kind) })
}

pub async fn fetch_boundary_names(kind: BoundaryKind) -> Result<Vec<String>, String> {
    let resp: BoundaryNamesResponse = query(
        r#"query BoundaryNames($kind: BoundaryKind!) { boundaryNames(kind: $kind) }"#,
        Some(build_boundary_names_variables(kind)),
    )
    .await?;
    Ok(resp.boundary_names)
}

async fn fetch_text(url: &str) -> Result<String, String> {
    let url = absolute_url(&origin()?, url);
    let resp = reqwest::get(&url).await.map_err(|e| e.to_string())?;
    if !resp.status().is_success() {
        return Err(format!("{} returned {}", url, resp.status()));
    }
    resp.text().await.map_err(|e| e.to_string())
}

pub async fn fetch_venues(url: &str) -> Result<Vec<VenueRow>, String> {
    let text = fetch_text(url).await?;
    tabular::venues_from_csv(&text).map_err(|e| e.to_string())
}

pub async fn fetch_travels(url: &str) -> Result<Vec<TravelRow>, String> {
    let text = fetch_text(url).await?;
    tabular::travels_from_csv(&text).map_err(|e| e.to_string())
}

pub async fn fetch_opinions(url: &str) -> Result<Vec<OpinionRow>, String> {
    let text = fetch_text(url).await?;
    tabular::opinions_from_csv(&text).map_err(|e| e.to_string())
}

thread_local! {
    static BOUNDARIES: RefCell<Option<Rc<BoundaryIndex>>> = const { RefCell::new(None) };
}

/// Both boundary collections, fetched once per session. A failed load is not
/// cached so the next selection tries again.
pub async fn fetch_boundaries(urls: &BoundaryUrls) -> Result<Rc<BoundaryIndex>, String> {
    if let Some(cached) = BOUNDARIES.with(|b| b.borrow().clone()) {
        return Ok(cached);
    }

    let provinces_text = fetch_text(&urls.provinces).await?;
    let countries_text = fetch_text(&urls.countries).await?;
    let provinces = BoundarySet::from_geojson(&provinces_text, BoundaryKind::Province)
        .map_err(|e| e.to_string())?;
    let countries = BoundarySet::from_geojson(&countries_text, BoundaryKind::Country)
        .map_err(|e| e.to_string())?;

    let index = Rc::new(BoundaryIndex::new(provinces, countries));
    BOUNDARIES.with(|b| *b.borrow_mut() = Some(index.clone()));
    Ok(index)
}

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Post an encoded form body to an intake endpoint. In the browser the
/// request is made in no-cors mode, so only network failure is observable.
pub async fn post_form(endpoint: &str, body: &str) -> Result<(), String> {
    let request = reqwest::Client::new()
        .post(endpoint)
        .header("Content-Type", FORM_CONTENT_TYPE)
        .body(body.to_string());

    #[cfg(target_arch = "wasm32")]
    let request = request.fetch_mode_no_cors();

    let resp = request.send().await.map_err(|e| e.to_string())?;

    #[cfg(not(target_arch = "wasm32"))]
    resp.error_for_status().map_err(|e| e.to_string())?;
    #[cfg(target_arch = "wasm32")]
    let _ = resp;

    Ok(())
}
