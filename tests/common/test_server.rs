use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use serde_json::{Value, json};
use tempfile::TempDir;

pub struct TestServer {
    pub temp_dir: TempDir,
    pub base_url: String,
    pub admin_token: String,
    pub client: reqwest::Client,
    server_process: Option<Child>,
}

/// A user created through the admin API, with a bearer token.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

pub fn binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_corkboard"))
}

impl TestServer {
    pub async fn start() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let data_dir = temp_dir.path();
        let binary = binary();

        let init_output = Command::new(&binary)
            .args(["admin", "init", "--data-dir"])
            .arg(data_dir)
            .arg("--non-interactive")
            .output()
            .expect("run init");
        assert!(
            init_output.status.success(),
            "Failed to initialize database"
        );

        let token_path = data_dir.join(".admin_token");
        let admin_token = std::fs::read_to_string(&token_path)
            .expect("read admin token")
            .trim()
            .to_string();

        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        drop(listener);

        let base_url = format!("http://127.0.0.1:{}", port);

        let server_process = Command::new(&binary)
            .args(["serve", "--data-dir"])
            .arg(data_dir)
            .args(["--host", "127.0.0.1", "--port"])
            .arg(port.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("start server");

        Self::wait_for_ready(&base_url).await;

        Self {
            temp_dir,
            base_url,
            admin_token,
            client: reqwest::Client::new(),
            server_process: Some(server_process),
        }
    }

    async fn wait_for_ready(base_url: &str) {
        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client
                .get(format!("{}/health", base_url))
                .send()
                .await
                .is_ok()
            {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
        panic!("Server did not become ready");
    }

    pub fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    pub async fn create_user(&self, email: &str, name: &str) -> TestUser {
        let resp: Value = self
            .client
            .post(self.url("/admin/users"))
            .bearer_auth(&self.admin_token)
            .json(&json!({"email": email, "name": name}))
            .send()
            .await
            .expect("create user")
            .json()
            .await
            .expect("parse user response");
        let id = resp["data"]["id"].as_str().expect("user id").to_string();

        let resp: Value = self
            .client
            .post(self.url(&format!("/admin/users/{id}/tokens")))
            .bearer_auth(&self.admin_token)
            .json(&json!({}))
            .send()
            .await
            .expect("create user token")
            .json()
            .await
            .expect("parse token response");
        let token = resp["data"]["token"].as_str().expect("token").to_string();

        TestUser {
            id,
            email: email.to_string(),
            token,
        }
    }

    /// Sends a request as `user` and returns the status with the parsed body.
    /// Empty bodies (204) come back as `Value::Null`.
    pub async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        user: &TestUser,
        body: Option<Value>,
    ) -> (reqwest::StatusCode, Value) {
        let mut req = self
            .client
            .request(method, self.url(path))
            .bearer_auth(&user.token);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req.send().await.expect("send request");
        let status = resp.status();
        let text = resp.text().await.expect("read body");
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).expect("parse body")
        };
        (status, body)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(mut process) = self.server_process.take() {
            let _ = process.kill();
            let _ = process.wait();
        }
    }
}
