use async_trait::async_trait;
use reqwest::{Client, header::CONTENT_TYPE};
use std::fmt::Debug;
use tracing::{debug, warn};

const ICON_URL_BASE: &str = "https://openweathermap.org/img/wn";

/// URL of the condition icon for an OpenWeather icon code such as `01d`.
pub fn icon_url(code: &str) -> String {
    format!("{ICON_URL_BASE}/{code}.png")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub url: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Loads images by URL. Failures stay inside the loader: callers only see
/// whether an image arrived.
#[async_trait]
pub trait ImageLoader: Send + Sync + Debug {
    async fn load(&self, url: &str) -> Option<Image>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpImageLoader {
    http: Client,
}

impl HttpImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    async fn fetch(&self, url: &str) -> reqwest::Result<Image> {
        let res = self.http.get(url).send().await?.error_for_status()?;

        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = res.bytes().await?.to_vec();

        Ok(Image {
            url: url.to_string(),
            content_type,
            bytes,
        })
    }
}

#[async_trait]
impl ImageLoader for HttpImageLoader {
    async fn load(&self, url: &str) -> Option<Image> {
        match self.fetch(url).await {
            Ok(image) => {
                debug!(url, size = image.bytes.len(), "image loaded");
                Some(image)
            }
            Err(err) => {
                warn!(url, error = %err, "image could not be loaded");
                None
            }
        }
    }
}
