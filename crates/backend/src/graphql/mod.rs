use std::sync::Arc;

use async_graphql::{Context, Enum, Object, SimpleObject};
use picker_shared::{AddressResult, Coordinate, DmsPair};

use crate::geocoder::OpenCageClient;

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum AddressStatus {
    Resolved,
    NotFound,
    Failed,
}

// GraphQL output types

#[derive(SimpleObject, Debug)]
pub struct GqlAddress {
    pub status: AddressStatus,
    pub formatted: Option<String>,
}

impl From<AddressResult> for GqlAddress {
    fn from(result: AddressResult) -> Self {
        match result {
            AddressResult::Resolved(text) => GqlAddress {
                status: AddressStatus::Resolved,
                formatted: Some(text),
            },
            AddressResult::NotFound => GqlAddress {
                status: AddressStatus::NotFound,
                formatted: None,
            },
            AddressResult::FetchError => GqlAddress {
                status: AddressStatus::Failed,
                formatted: None,
            },
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlDmsPair {
    pub latitude: String,
    pub longitude: String,
}

impl From<DmsPair> for GqlDmsPair {
    fn from(pair: DmsPair) -> Self {
        GqlDmsPair {
            latitude: pair.latitude,
            longitude: pair.longitude,
        }
    }
}

fn coordinate(lat: f64, lng: f64) -> async_graphql::Result<Coordinate> {
    Coordinate::new(lat, lng)
        .ok_or_else(|| async_graphql::Error::new(format!("Coordinate out of range: {lat}, {lng}")))
}

// Query root

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Street address for a point. Provider failures come back as a
    /// `FAILED` status rather than a GraphQL error.
    async fn reverse_geocode(
        &self,
        ctx: &Context<'_>,
        lat: f64,
        lng: f64,
    ) -> async_graphql::Result<GqlAddress> {
        let geocoder = ctx.data::<Arc<OpenCageClient>>()?;
        let point = coordinate(lat, lng)?;
        Ok(geocoder.address(point).await.into())
    }

    async fn format_dms(&self, lat: f64, lng: f64) -> async_graphql::Result<GqlDmsPair> {
        let point = coordinate(lat, lng)?;
        Ok(DmsPair::from_coordinate(point).into())
    }
}

pub type Schema =
    async_graphql::Schema<QueryRoot, async_graphql::EmptyMutation, async_graphql::EmptySubscription>;

pub fn build_schema(geocoder: Arc<OpenCageClient>) -> Schema {
    async_graphql::Schema::build(
        QueryRoot,
        async_graphql::EmptyMutation,
        async_graphql::EmptySubscription,
    )
    .data(geocoder)
    .finish()
}
