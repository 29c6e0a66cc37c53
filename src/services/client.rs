use crate::core::config::Config;
use crate::services::request::{build_form, FormContract, GenerationRequest};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use url::Url;

#[cfg(target_arch = "wasm32")]
pub trait GeneratorBounds {}
#[cfg(target_arch = "wasm32")]
impl<T> GeneratorBounds for T {}

#[cfg(not(target_arch = "wasm32"))]
pub trait GeneratorBounds: Send + Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync> GeneratorBounds for T {}

/// Turns a script plus voice metadata into audio bytes.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait AudioGenerator: GeneratorBounds {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<u8>>;
}

pub struct HttpAudioClient {
    client: Client,
    endpoint: Url,
    contract: FormContract,
}

impl HttpAudioClient {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: Client::new(),
            endpoint: config.endpoint_url()?,
            contract: config.contract(),
        })
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl AudioGenerator for HttpAudioClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<u8>> {
        let form = build_form(request, &self.contract)?;

        info!(
            "Uploading {} ({} bytes, {} actors) to {}",
            request.file.name,
            request.file.bytes.len(),
            request.actor_count,
            self.endpoint
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .context("Failed to send generation request")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Request failed with status {}", status);
        }

        let audio = response
            .bytes()
            .await
            .context("Failed to read audio response")?;
        debug!("Received {} bytes of audio", audio.len());
        Ok(audio.to_vec())
    }
}

/// GETs a UTF-8 text resource; any non-2xx status is an error.
pub async fn fetch_text(client: &Client, url: Url) -> Result<String> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("Failed to fetch {}", url))?;

    let status = response.status();
    if !status.is_success() {
        bail!("Failed to load {} (status {})", url, status);
    }

    response
        .text()
        .await
        .with_context(|| format!("Failed to read {}", url))
}

/// Absolute URLs pass through; relative paths are joined onto `base`.
pub fn resolve_url(base: Option<&Url>, raw: &str) -> Result<Url> {
    match Url::parse(raw) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = base.ok_or_else(|| anyhow!("Relative URL '{}' needs a base URL", raw))?;
            base.join(raw)
                .with_context(|| format!("Cannot resolve '{}' against {}", raw, base))
        }
        Err(e) => Err(anyhow!("Invalid URL '{}': {}", raw, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::form::VoiceForm;
    use crate::services::request::UploadFile;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> Result<HttpAudioClient> {
        let config = Config {
            endpoint: format!("{}/generate_audio", server.uri()),
            ..Config::default()
        };
        HttpAudioClient::new(&config)
    }

    fn request() -> Result<GenerationRequest> {
        let mut form = VoiceForm::new();
        form.update_voice_inputs("2");
        form.set_description(1, "warm British woman")?;
        Ok(GenerationRequest::new(
            &form,
            UploadFile::new("fight.txt", b"[SPEAKER1] Hello there".to_vec()),
        ))
    }

    #[test]
    fn test_endpoint_is_parsed_from_config() -> Result<()> {
        let client = HttpAudioClient::new(&Config::default())?;
        assert_eq!(client.endpoint().as_str(), "http://127.0.0.1:5000/generate_audio");

        let config = Config {
            endpoint: "not a url".to_string(),
            ..Config::default()
        };
        assert!(HttpAudioClient::new(&config).is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_posts_multipart_and_returns_body() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate_audio"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"RIFF-audio".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let audio = client_for(&server)?.generate(&request()?).await?;
        assert_eq!(audio, b"RIFF-audio");

        let received = server
            .received_requests()
            .await
            .ok_or_else(|| anyhow!("request recording disabled"))?;
        assert_eq!(received.len(), 1);

        let content_type = received[0]
            .headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("multipart/form-data"));

        let body = String::from_utf8_lossy(&received[0].body);
        assert!(body.contains("name=\"file\"; filename=\"fight.txt\""));
        assert!(body.contains("[SPEAKER1] Hello there"));
        assert!(body.contains("name=\"numActors\"\r\n\r\n2\r\n"));
        assert!(body.contains("name=\"voiceDescriptions\"\r\n\r\n[\"warm British woman\",\"\"]\r\n"));
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_fails_on_non_success_status() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("{\"error\": \"No text provided\"}"))
            .mount(&server)
            .await;

        let err = client_for(&server)?
            .generate(&request()?)
            .await
            .expect_err("non-2xx must fail");
        assert!(err.to_string().contains("400"));
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_text() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/demo/tomorrow.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Tomorrow, and tomorrow"))
            .mount(&server)
            .await;

        let base = Url::parse(&format!("{}/index.html", server.uri()))?;
        let client = Client::new();

        let url = resolve_url(Some(&base), "demo/tomorrow.txt")?;
        assert_eq!(fetch_text(&client, url).await?, "Tomorrow, and tomorrow");

        let missing = resolve_url(Some(&base), "demo/missing.txt")?;
        assert!(fetch_text(&client, missing).await.is_err());
        Ok(())
    }

    #[test]
    fn test_resolve_url() -> Result<()> {
        let base = Url::parse("http://localhost:8080/app/index.html")?;
        assert_eq!(
            resolve_url(Some(&base), "../TestingMultitalk/tomorrow.txt")?.as_str(),
            "http://localhost:8080/TestingMultitalk/tomorrow.txt"
        );
        assert_eq!(
            resolve_url(None, "https://example.com/a.txt")?.as_str(),
            "https://example.com/a.txt"
        );
        assert!(resolve_url(None, "demo/tomorrow.txt").is_err());
        Ok(())
    }
}
