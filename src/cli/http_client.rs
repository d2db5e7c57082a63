use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::commands::RemoteArgs;
use crate::client::BoardApi;
use crate::types::{BoardView, Card};

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MoveCardBody<'a> {
    target_list_id: &'a str,
    position: i64,
}

impl ApiClient {
    pub fn new(remote: &RemoteArgs) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: remote.server.trim_end_matches('/').to_string(),
            token: remote.token.clone(),
        })
    }

    pub fn get<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let url = format!("{}/api/v1{}", self.base_url, path);
        let resp = self.client.get(&url).bearer_auth(&self.token).send()?;
        self.handle_response(resp)
    }

    pub fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        let url = format!("{}/api/v1{}", self.base_url, path);
        let resp = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()?;
        self.handle_response(resp)
    }

    fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::blocking::Response,
    ) -> anyhow::Result<T> {
        if resp.status().is_success() {
            let api_resp: ApiResponse<T> = resp.json()?;
            api_resp
                .data
                .ok_or_else(|| anyhow::anyhow!("Server returned an empty response"))
        } else {
            let status = resp.status();
            let api_resp: ApiResponse<()> = resp.json()?;
            Err(anyhow::anyhow!(api_resp.error.unwrap_or_else(|| {
                format!("Server error {status} (no details provided)")
            })))
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl BoardApi for ApiClient {
    fn fetch_board(&self, board_id: &str) -> anyhow::Result<BoardView> {
        self.get(&format!("/boards/{board_id}"))
    }

    fn move_card(&self, card_id: &str, target_list_id: &str, position: i64) -> anyhow::Result<Card> {
        self.put(
            &format!("/cards/{card_id}/move"),
            &MoveCardBody {
                target_list_id,
                position,
            },
        )
    }
}
