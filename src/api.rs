// API client module: a small blocking HTTP client for the two hosted
// endpoints. Uploading turns a local file into a hosted URL; analysis sends
// that URL to the vision model and returns its description.

use crate::config::Config;
use crate::description::Description;
use crate::{Error, Result};
use reqwest::blocking::{multipart, Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Holds a reqwest blocking client plus the endpoint URLs and prompt. The
/// credential is not stored here; callers pass it to `analyze_image`.
#[derive(Clone)]
pub struct FalClient {
    client: Client,
    upload_url: String,
    model_url: String,
    prompt: String,
}

/// Body of the analysis request.
#[derive(Serialize, Debug)]
pub struct AnalyzeRequest<'a> {
    pub image_url: &'a str,
    pub prompt: &'a str,
}

impl FalClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(FalClient {
            client,
            upload_url: config.upload_url.clone(),
            model_url: config.model_url.clone(),
            prompt: config.prompt.clone(),
        })
    }

    /// Upload an image as multipart/form-data and return its hosted URL.
    ///
    /// The part is always labelled `image/jpeg`; the endpoint sniffs the
    /// real format itself. The file handle moves into the request body and is
    /// closed when the request finishes, whatever the outcome.
    pub fn upload_image(&self, file_path: &Path) -> Result<String> {
        let file = File::open(file_path).map_err(|source| Error::File {
            path: file_path.to_path_buf(),
            source,
        })?;
        let file_name = file_path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("image.jpg")
            .to_string();

        debug!(url = %self.upload_url, file = %file_name, "uploading image");
        let part = multipart::Part::reader(file)
            .file_name(file_name)
            .mime_str("image/jpeg")?;
        let form = multipart::Form::new().part("file", part);

        let res = self.client.post(&self.upload_url).multipart(form).send()?;
        let body = json_object(res)?;

        match body.get("url") {
            Some(Value::String(url)) => {
                info!(%url, "image uploaded");
                Ok(url.clone())
            }
            _ => Err(Error::MissingField("url")),
        }
    }

    /// Ask the model to describe the image at `image_url`. One attempt only.
    pub fn analyze_image(&self, image_url: &str, api_key: &str) -> Result<Description> {
        let payload = AnalyzeRequest {
            image_url,
            prompt: &self.prompt,
        };

        debug!(url = %self.model_url, %image_url, "requesting analysis");
        let res = self
            .client
            .post(&self.model_url)
            .headers(auth_headers(api_key)?)
            .json(&payload)
            .send()?;
        let body = json_object(res)?;

        let description = Description::from_response(body);
        if description.text().is_none() {
            debug!("analysis response has no text field, keeping full body");
        }
        Ok(description)
    }
}

/// `Authorization: Key <api_key>` plus the JSON content type.
fn auth_headers(api_key: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let val = HeaderValue::from_str(&format!("Key {}", api_key))
        .map_err(|_| Error::Config("api key contains characters not allowed in a header".into()))?;
    headers.insert(AUTHORIZATION, val);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

/// Check the status, then decode the body as a JSON object.
fn json_object(res: Response) -> Result<Map<String, Value>> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().unwrap_or_default();
        debug!(%status, "request rejected");
        return Err(Error::Status {
            status,
            body: body.trim().to_string(),
        });
    }
    let text = res.text()?;
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Error::Decode(format!("expected a JSON object, got {}", other))),
        Err(e) => Err(Error::Decode(e.to_string())),
    }
}
