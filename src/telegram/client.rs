//! User-session gateway client
//!
//! The gateway keeps the MTProto user session identified by `session_name`
//! and exposes the handful of calls the analyzer needs as JSON over HTTP.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::RequestBuilder;
use reqwest::Response;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::types::*;
use super::ChannelSource;
use crate::config::AppConfig;
use crate::config::AuthConfig;
use crate::models::ChannelInfo;
use crate::ChanRankError;
use crate::Result;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Gateway-backed user client
#[derive(Clone)]
pub struct UserApiClient {
    client: Client,
    base_url: String,
    session_name: String,
    api_id: Option<i64>,
    api_hash: Option<String>,
}

impl UserApiClient {
    /// Create a new client for `endpoint`
    pub fn new(client: Client, endpoint: &str, session_name: &str) -> Self {
        Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
            session_name: session_name.to_string(),
            api_id: None,
            api_hash: None,
        }
    }

    /// Create a new client from AppConfig
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = super::build_http_client(&config.proxy, REQUEST_TIMEOUT)?;
        let mut this = Self::new(client, config.gateway_url(), &config.telegram.session_name);
        this.api_id = config.telegram.api_id;
        this.api_hash.clone_from(&config.telegram.api_hash);
        Ok(this)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .client
            .request(method, url)
            .header("X-Session-Name", &self.session_name);
        if let Some(api_id) = self.api_id {
            builder = builder.header("X-Api-Id", api_id.to_string());
        }
        if let Some(api_hash) = &self.api_hash {
            builder = builder.header("X-Api-Hash", api_hash);
        }
        builder
    }

    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| ChanRankError::RemoteAccess(format!("{what}: {e}")))?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ChanRankError::Unauthorized(
                format!("{what}: session is not logged in"),
            )),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(ChanRankError::RemoteAccess(format!(
                    "{what}: HTTP {status} {body}"
                )))
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T> {
        let response = self.send(self.request(reqwest::Method::GET, path), what).await?;
        Ok(response.json().await?)
    }

    /// Log the session in with the phone/code/password from configuration.
    ///
    /// Mirrors the interactive flow: the first call without a code asks the
    /// platform to send one and returns `Unauthorized` so the user can rerun
    /// with `TELEGRAM_CODE` (and `TELEGRAM_PASSWORD` for two-step accounts).
    pub async fn login(&self, auth: &AuthConfig) -> Result<()> {
        if self.is_authorized().await? {
            return Ok(());
        }
        if auth.phone.is_empty() {
            return Err(ChanRankError::Unauthorized(
                "请设置 TELEGRAM_PHONE 后重新运行".to_string(),
            ));
        }

        let sent: SendCodeResponse = self
            .send(
                self.request(reqwest::Method::POST, "/v1/auth/send_code")
                    .json(&serde_json::json!({ "phone": auth.phone })),
                "send login code",
            )
            .await?
            .json()
            .await?;

        if auth.code.is_empty() {
            return Err(ChanRankError::Unauthorized(
                "验证码已发送到你的 Telegram，请设置 TELEGRAM_CODE=验证码 后重新运行".to_string(),
            ));
        }

        let signed: SignInResponse = self
            .send(
                self.request(reqwest::Method::POST, "/v1/auth/sign_in").json(&serde_json::json!({
                    "phone": auth.phone,
                    "code": auth.code,
                    "phone_code_hash": sent.phone_code_hash,
                })),
                "sign in",
            )
            .await?
            .json()
            .await?;

        if signed.authorized {
            return Ok(());
        }
        if !signed.password_needed {
            return Err(ChanRankError::Unauthorized("sign-in was rejected".to_string()));
        }
        if auth.password.is_empty() {
            return Err(ChanRankError::Unauthorized(
                "需要两步验证密码，请设置 TELEGRAM_PASSWORD 后重新运行".to_string(),
            ));
        }

        let signed: SignInResponse = self
            .send(
                self.request(reqwest::Method::POST, "/v1/auth/sign_in")
                    .json(&serde_json::json!({ "password": auth.password })),
                "two-step sign in",
            )
            .await?
            .json()
            .await?;

        if signed.authorized {
            Ok(())
        } else {
            Err(ChanRankError::Unauthorized("two-step password was rejected".to_string()))
        }
    }
}

/// Query string for the resolve call, form-encoded
pub(crate) fn resolve_query(reference: &ChannelRef) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    match reference {
        ChannelRef::Username(name) => query.append_pair("username", name),
        ChannelRef::Id(id) => query.append_pair("id", &id.to_string()),
    };
    query.finish()
}

#[async_trait]
impl ChannelSource for UserApiClient {
    async fn is_authorized(&self) -> Result<bool> {
        let status: AuthStatusResponse = self.get_json("/v1/auth/status", "check session").await?;
        Ok(status.authorized)
    }

    async fn list_channels(&self) -> Result<Vec<ChannelInfo>> {
        let response: ChannelsResponse = self
            .get_json("/v1/dialogs?type=channel", "list channels")
            .await?;
        tracing::debug!("Gateway returned {} channels", response.channels.len());
        Ok(response.channels)
    }

    async fn resolve_channel(&self, reference: &ChannelRef) -> Result<ChannelInfo> {
        let builder = self.request(
            reqwest::Method::GET,
            &format!("/v1/entities/resolve?{}", resolve_query(reference)),
        );
        let response = builder
            .send()
            .await
            .map_err(|e| ChanRankError::RemoteAccess(format!("resolve {reference}: {e}")))?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => {
                Err(ChanRankError::ChannelNotFound(reference.to_string()))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ChanRankError::Unauthorized(
                format!("resolve {reference}: session is not logged in"),
            )),
            status if status.is_success() => Ok(response.json().await?),
            status => Err(ChanRankError::RemoteAccess(format!(
                "resolve {reference}: HTTP {status}"
            ))),
        }
    }

    async fn estimate_message_count(&self, channel: &ChannelInfo) -> Result<u64> {
        let stats: ChannelStatsResponse = self
            .get_json(
                &format!("/v1/channels/{}/stats", channel.id),
                "channel stats",
            )
            .await?;
        Ok(stats.message_count)
    }

    async fn history_page(
        &self,
        channel: &ChannelInfo,
        offset_id: Option<i64>,
        limit: u32,
    ) -> Result<Vec<RemoteMessage>> {
        let mut path = format!("/v1/channels/{}/messages?limit={limit}", channel.id);
        if let Some(offset) = offset_id {
            path.push_str(&format!("&offset_id={offset}"));
        }
        let page: MessagesResponse = self.get_json(&path, "fetch history").await?;
        Ok(page.messages)
    }

    async fn download_photo(
        &self,
        channel: &ChannelInfo,
        message_id: i64,
    ) -> Result<Option<MediaBlob>> {
        let path = format!("/v1/channels/{}/messages/{message_id}/photo", channel.id);
        let response = self
            .request(reqwest::Method::GET, &path)
            .send()
            .await
            .map_err(|e| ChanRankError::RemoteAccess(format!("download photo: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ChanRankError::RemoteAccess(format!(
                "download photo {message_id}: HTTP {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = response.bytes().await?.to_vec();
        Ok(Some(MediaBlob {
            bytes,
            content_type,
        }))
    }

    async fn send_to_saved(&self, text: &str, photo: Option<&Path>) -> Result<()> {
        match photo {
            Some(path) => {
                let bytes = tokio::fs::read(path).await?;
                let file_name = path
                    .file_name()
                    .map_or_else(|| "photo.jpg".to_string(), |n| n.to_string_lossy().into_owned());
                let form = reqwest::multipart::Form::new()
                    .text("caption", text.to_string())
                    .part("photo", reqwest::multipart::Part::bytes(bytes).file_name(file_name));
                self.send(
                    self.request(reqwest::Method::POST, "/v1/saved/photos").multipart(form),
                    "send photo to saved messages",
                )
                .await?;
            }
            None => {
                self.send(
                    self.request(reqwest::Method::POST, "/v1/saved/messages")
                        .json(&SendTextRequest { text }),
                    "send to saved messages",
                )
                .await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_query_encodes_username() {
        let query = resolve_query(&ChannelRef::Username("news&id=1 x".to_string()));
        assert_eq!(query, "username=news%26id%3D1+x");
    }

    #[test]
    fn test_resolve_query_id() {
        assert_eq!(resolve_query(&ChannelRef::Id(-5)), "id=-5");
    }
}
