use std::time::Duration;

use async_trait::async_trait;
use labtrack_api::models::*;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{ClientError, ErrorBody, Result, from_status};

/// Operations the capture workflow needs from the server.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_rooms(&self) -> Result<Vec<RoomResponse>>;

    async fn list_equipment(&self) -> Result<Vec<EquipmentResponse>>;

    /// `Ok(None)` when no room carries `code`.
    async fn room_by_code(&self, code: &str) -> Result<Option<RoomResponse>>;

    /// `Ok(None)` when no equipment carries `code`.
    async fn equipment_by_code(&self, code: &str) -> Result<Option<EquipmentResponse>>;

    async fn submit_room_reading(
        &self,
        room_id: i32,
        request: &CreateTemperatureReadingRequest,
    ) -> Result<TemperatureLogResponse>;

    async fn submit_equipment_reading(
        &self,
        equipment_id: i32,
        request: &CreateTemperatureReadingRequest,
    ) -> Result<EquipmentTemperatureLogResponse>;

    async fn submit_inspection(
        &self,
        equipment_id: i32,
        request: &CreateInspectionRequest,
    ) -> Result<InspectionResponse>;

    /// Every room with its newest reading.
    async fn room_cards(&self) -> Result<Vec<RoomWithLatestReading>>;

    /// Temperature equipment with its newest reading.
    async fn equipment_cards(&self) -> Result<Vec<EquipmentWithLatestReading>>;

    /// Inspectable equipment with its newest inspection.
    async fn inspection_cards(&self) -> Result<Vec<EquipmentWithLatestInspection>>;
}

/// [`Backend`] over the labtrack HTTP API, authenticated with a bearer token.
#[derive(Clone)]
pub struct HttpBackend {
    http_client: reqwest::Client,
    base_url: Url,
    token: String,
}

pub(crate) fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_default()
}

/// Client for long-lived streams: no overall deadline, only a connect timeout.
pub(crate) fn build_feed_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_default()
}

/// Appends path segments to `base`, percent-encoding each one.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidState("server address cannot carry a path"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let bytes = response.bytes().await.unwrap_or_default();
    Err(from_status(status, ErrorBody::parse(&bytes)))
}

impl HttpBackend {
    pub fn new(http_client: reqwest::Client, base_url: Url, token: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url,
            token: token.into(),
        }
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = endpoint(&self.base_url, segments)?;
        log::debug!("{method} {url}");

        Ok(self
            .http_client
            .request(method, url)
            .bearer_auth(&self.token))
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let response = self.request(Method::GET, segments)?.send().await?;
        read_json(response).await
    }

    async fn get_optional<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Option<T>> {
        let response = self.request(Method::GET, segments)?.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_json(response).await.map(Some)
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T> {
        let response = self
            .request(Method::POST, segments)?
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_rooms(&self) -> Result<Vec<RoomResponse>> {
        self.get(&["api", "rooms"]).await
    }

    async fn list_equipment(&self) -> Result<Vec<EquipmentResponse>> {
        self.get(&["api", "equipment"]).await
    }

    async fn room_by_code(&self, code: &str) -> Result<Option<RoomResponse>> {
        self.get_optional(&["api", "rooms", "by-code", code]).await
    }

    async fn equipment_by_code(&self, code: &str) -> Result<Option<EquipmentResponse>> {
        self.get_optional(&["api", "equipment", "by-code", code])
            .await
    }

    async fn submit_room_reading(
        &self,
        room_id: i32,
        request: &CreateTemperatureReadingRequest,
    ) -> Result<TemperatureLogResponse> {
        let id = room_id.to_string();
        self.post(&["api", "rooms", &id, "readings"], request).await
    }

    async fn submit_equipment_reading(
        &self,
        equipment_id: i32,
        request: &CreateTemperatureReadingRequest,
    ) -> Result<EquipmentTemperatureLogResponse> {
        let id = equipment_id.to_string();
        self.post(&["api", "equipment", &id, "readings"], request)
            .await
    }

    async fn submit_inspection(
        &self,
        equipment_id: i32,
        request: &CreateInspectionRequest,
    ) -> Result<InspectionResponse> {
        let id = equipment_id.to_string();
        self.post(&["api", "equipment", &id, "inspections"], request)
            .await
    }

    async fn room_cards(&self) -> Result<Vec<RoomWithLatestReading>> {
        self.get(&["api", "dashboard", "rooms"]).await
    }

    async fn equipment_cards(&self) -> Result<Vec<EquipmentWithLatestReading>> {
        self.get(&["api", "dashboard", "equipment"]).await
    }

    async fn inspection_cards(&self) -> Result<Vec<EquipmentWithLatestInspection>> {
        self.get(&["api", "dashboard", "inspections"]).await
    }
}
