use std::sync::Arc;

use async_graphql::{Context, Enum, Object, SimpleObject};
use tourmap_shared::boundary::BoundaryKind;
use tourmap_shared::models::{FormRelay, LatLng, SiteConfig, TileLayer};

use crate::assets::Assets;

#[derive(Enum, Copy, Clone, Eq, PartialEq)]
#[graphql(name = "BoundaryKind")]
pub enum GqlBoundaryKind {
    Province,
    Country,
}

impl From<GqlBoundaryKind> for BoundaryKind {
    fn from(k: GqlBoundaryKind) -> Self {
        match k {
            GqlBoundaryKind::Province => BoundaryKind::Province,
            GqlBoundaryKind::Country => BoundaryKind::Country,
        }
    }
}

// GraphQL output types

#[derive(SimpleObject)]
pub struct GqlLatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<LatLng> for GqlLatLng {
    fn from(p: LatLng) -> Self {
        GqlLatLng { lat: p.lat, lng: p.lng }
    }
}

#[derive(SimpleObject)]
pub struct GqlSheetUrls {
    pub venues: String,
    pub travels: String,
    pub opinions: String,
}

#[derive(SimpleObject)]
pub struct GqlBoundaryUrls {
    pub countries: String,
    pub provinces: String,
}

#[derive(SimpleObject)]
pub struct GqlTileLayer {
    pub url_template: String,
    pub attribution: String,
    pub min_zoom: u32,
    pub max_zoom: u32,
    pub center: GqlLatLng,
    pub zoom: u32,
}

impl From<&TileLayer> for GqlTileLayer {
    fn from(t: &TileLayer) -> Self {
        GqlTileLayer {
            url_template: t.url_template.clone(),
            attribution: t.attribution.clone(),
            min_zoom: t.min_zoom as u32,
            max_zoom: t.max_zoom as u32,
            center: t.center.into(),
            zoom: t.zoom as u32,
        }
    }
}

/// One logical field and the name the intake endpoint expects for it.
#[derive(SimpleObject)]
pub struct GqlFieldName {
    pub logical: String,
    pub name: String,
}

#[derive(SimpleObject)]
pub struct GqlFormRelay {
    pub endpoint: String,
    pub fields: Vec<GqlFieldName>,
}

impl From<&FormRelay> for GqlFormRelay {
    fn from(r: &FormRelay) -> Self {
        GqlFormRelay {
            endpoint: r.endpoint.clone(),
            fields: r
                .fields
                .iter()
                .map(|(logical, name)| GqlFieldName {
                    logical: logical.clone(),
                    name: name.clone(),
                })
                .collect(),
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlSiteConfig {
    pub sheets: GqlSheetUrls,
    pub boundaries: GqlBoundaryUrls,
    pub venue_map: GqlTileLayer,
    pub opinion_map: GqlTileLayer,
    pub travel_relay: GqlFormRelay,
    pub opinion_relay: GqlFormRelay,
}

impl From<&SiteConfig> for GqlSiteConfig {
    fn from(s: &SiteConfig) -> Self {
        GqlSiteConfig {
            sheets: GqlSheetUrls {
                venues: s.sheets.venues.clone(),
                travels: s.sheets.travels.clone(),
                opinions: s.sheets.opinions.clone(),
            },
            boundaries: GqlBoundaryUrls {
                countries: s.boundaries.countries.clone(),
                provinces: s.boundaries.provinces.clone(),
            },
            venue_map: (&s.venue_map).into(),
            opinion_map: (&s.opinion_map).into(),
            travel_relay: (&s.travel_relay).into(),
            opinion_relay: (&s.opinion_relay).into(),
        }
    }
}

// Query root

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Sheet URLs, boundary sources, tile layers and relay endpoints.
    async fn site(&self, ctx: &Context<'_>) -> async_graphql::Result<GqlSiteConfig> {
        let assets = ctx.data::<Arc<Assets>>()?;
        Ok(GqlSiteConfig::from(&assets.site))
    }

    /// Sorted origin names for the travel form. Spain is not offered as a
    /// country.
    async fn boundary_names(
        &self,
        ctx: &Context<'_>,
        kind: GqlBoundaryKind,
    ) -> async_graphql::Result<Vec<String>> {
        let assets = ctx.data::<Arc<Assets>>()?;
        Ok(assets.boundaries.names(kind.into()))
    }
}

pub type Schema = async_graphql::Schema<
    QueryRoot,
    async_graphql::EmptyMutation,
    async_graphql::EmptySubscription,
>;

pub fn build_schema(assets: Arc<Assets>) -> Schema {
    async_graphql::Schema::build(
        QueryRoot,
        async_graphql::EmptyMutation,
        async_graphql::EmptySubscription,
    )
    .data(assets)
    .finish()
}
